// error.rs — Error types for the resource watcher.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch backend error: {0}")]
    Notify(#[from] notify::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn watcher worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("watcher is shut down")]
    Closed,
}
