// error.rs — Error types for the MCP gateway.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or running the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The sandbox could not be built from the configuration.
    #[error("sandbox error: {0}")]
    Sandbox(#[from] warden_sandbox::SandboxError),

    /// The resource watcher failed to start.
    #[error("watcher error: {0}")]
    Watch(#[from] warden_watcher::WatchError),

    /// A connector operation failed.
    #[error("connector error: {0}")]
    Connector(#[from] warden_connector_fs::FsConnectorError),

    /// The config file could not be parsed.
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
