// sink.rs — Resource change sinks and dispatch.
//
// Every registry change is handed to each subscribed sink in order, on the
// thread that caused it (the watcher worker for OS events, the tool call for
// self-caused changes). A failing sink is logged and skipped; it never stops
// the others or the registry update.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use crate::error::WatchError;
use crate::event::ResourceChange;

/// Receives resource changes.
pub trait ResourceSink: Send + Sync {
    /// Handle a change. Errors are logged by the dispatcher.
    fn send(&self, change: &ResourceChange) -> Result<(), WatchError>;
}

/// Appends each change as one JSON line to a file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceSink for JsonlSink {
    fn send(&self, change: &ResourceChange) -> Result<(), WatchError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| WatchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| WatchError::Io {
                path: self.path.clone(),
                source,
            })?;

        let json = serde_json::to_string(change)?;
        writeln!(file, "{}", json).map_err(|source| WatchError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Forwards changes into an in-process channel.
pub struct ChannelSink {
    tx: Sender<ResourceChange>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ResourceChange>) -> Self {
        Self { tx }
    }
}

impl ResourceSink for ChannelSink {
    fn send(&self, change: &ResourceChange) -> Result<(), WatchError> {
        self.tx.send(change.clone()).map_err(|_| WatchError::Closed)
    }
}

/// Fans a change out to every registered sink.
#[derive(Default)]
pub struct ResourceDispatcher {
    sinks: Vec<Box<dyn ResourceSink>>,
}

impl ResourceDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResourceSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn dispatch(&self, change: &ResourceChange) {
        for sink in &self.sinks {
            match sink.send(change) {
                Ok(()) => {}
                // A dropped receiver is an unsubscribe, not a fault.
                Err(WatchError::Closed) => {
                    tracing::debug!(uri = %change.uri, "sink receiver closed")
                }
                Err(e) => tracing::warn!(uri = %change.uri, error = %e, "resource sink error"),
            }
        }
    }
}
