// error.rs — Error types for the path sandbox.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring the sandbox or validating paths.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The resolved path is not contained in any allowed root. Unparseable
    /// input is reported through this variant as well.
    #[error("access denied to path: {path}. allowed directories: {}", .allowed.join(", "))]
    AccessDenied { path: String, allowed: Vec<String> },

    /// A configured root exists on disk but is not a directory.
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// The sandbox configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file I/O operation failed (e.g. creating a missing root).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SandboxError {
    /// True for containment failures.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SandboxError::AccessDenied { .. })
    }
}
