// error.rs — Error types for the filesystem connector.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use warden_edit::EditError;
use warden_sandbox::SandboxError;
use warden_watcher::WatchError;

/// Errors that can occur during filesystem connector operations.
#[derive(Debug, Error)]
pub enum FsConnectorError {
    /// The path failed sandbox validation. Always surfaced as-is.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error("no such file or directory: {path}")]
    NotFound { path: PathBuf },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An edit batch did not apply; the file was left untouched.
    #[error("edit of {path} failed: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("target already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("watcher error: {0}")]
    Watch(#[from] WatchError),
}

impl FsConnectorError {
    /// True for sandbox violations, which callers must treat as hard
    /// rejections.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, FsConnectorError::Sandbox(e) if e.is_access_denied())
    }

    /// Map an I/O failure, splitting out missing paths.
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FsConnectorError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FsConnectorError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
