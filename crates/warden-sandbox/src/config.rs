// config.rs — Sandbox configuration.
//
// The allowed roots arrive as one comma-separated string (ALLOWED_DIRS or
// --allowed-dirs) or as a TOML array. The optional host/container workspace
// pair turns on path remapping for containerized deployments; remapping is
// only active when both halves are present and non-empty.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Environment variable holding the comma-separated allowed roots.
pub const ALLOWED_DIRS_ENV: &str = "ALLOWED_DIRS";
/// Environment variable naming the workspace root as seen from the host.
pub const HOST_WORKSPACE_ENV: &str = "HOST_WORKSPACE";
/// Environment variable naming the same workspace as mounted in the container.
pub const CONTAINER_WORKSPACE_ENV: &str = "CONTAINER_WORKSPACE";

/// Configuration for a [`PathSandbox`](crate::PathSandbox).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Allowed root directories, in configured order.
    #[serde(default)]
    pub allowed_dirs: Vec<String>,

    /// Workspace root on the host machine (remap source).
    #[serde(default)]
    pub host_workspace: Option<String>,

    /// Workspace root inside the container (remap target).
    #[serde(default)]
    pub container_workspace: Option<String>,

    /// Working directory used to resolve relative paths. Defaults to the
    /// process working directory when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl SandboxConfig {
    /// Build a config from a comma-separated list of roots.
    pub fn from_allowed_dirs(raw: &str) -> Result<Self, SandboxError> {
        Ok(Self {
            allowed_dirs: parse_allowed_dirs(raw)?,
            ..Self::default()
        })
    }

    /// Read `ALLOWED_DIRS`, `HOST_WORKSPACE` and `CONTAINER_WORKSPACE`.
    pub fn from_env() -> Result<Self, SandboxError> {
        let raw = std::env::var(ALLOWED_DIRS_ENV).unwrap_or_default();
        let mut config = Self::from_allowed_dirs(&raw)?;
        config.host_workspace = std::env::var(HOST_WORKSPACE_ENV).ok();
        config.container_workspace = std::env::var(CONTAINER_WORKSPACE_ENV).ok();
        Ok(config)
    }

    /// Set the host/container remap pair.
    pub fn with_remap(
        mut self,
        host_workspace: impl Into<String>,
        container_workspace: impl Into<String>,
    ) -> Self {
        self.host_workspace = Some(host_workspace.into());
        self.container_workspace = Some(container_workspace.into());
        self
    }

    /// Resolve relative paths against `dir` instead of the process cwd.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The remap pair, if both halves are configured and non-empty.
    pub fn remap_pair(&self) -> Option<(&str, &str)> {
        let host = self.host_workspace.as_deref().map(str::trim)?;
        let container = self.container_workspace.as_deref().map(str::trim)?;
        if host.is_empty() || container.is_empty() {
            return None;
        }
        Some((host, container))
    }
}

/// Split a comma-separated root list, trimming whitespace and dropping
/// empty segments. An empty result is a configuration error.
pub fn parse_allowed_dirs(raw: &str) -> Result<Vec<String>, SandboxError> {
    let dirs: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if dirs.is_empty() {
        return Err(SandboxError::Config(format!(
            "{} not set or empty",
            ALLOWED_DIRS_ENV
        )));
    }
    Ok(dirs)
}
