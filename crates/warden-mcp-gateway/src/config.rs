// config.rs — Gateway configuration.
//
// GatewayConfig carries the sandbox settings plus the optional JSONL change
// log. It can be read from a TOML file whose top-level keys are the sandbox
// fields (`allowed_dirs`, `host_workspace`, `container_workspace`) and
// `events_log`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_sandbox::SandboxConfig;

use crate::error::GatewayError;

/// Configuration for the MCP gateway server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Allowed roots and optional host/container remap.
    #[serde(flatten)]
    pub sandbox: SandboxConfig,

    /// Append every resource change to this JSONL file.
    #[serde(default)]
    pub events_log: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn new(sandbox: SandboxConfig) -> Self {
        Self {
            sandbox,
            events_log: None,
        }
    }

    /// Read `ALLOWED_DIRS`, `HOST_WORKSPACE` and `CONTAINER_WORKSPACE`.
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self::new(SandboxConfig::from_env()?))
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| GatewayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| GatewayError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_events_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.events_log = Some(path.into());
        self
    }
}
