// backend.rs — The OS notification primitive behind the watcher.
//
// Watches are per-directory and non-recursive; the watcher itself extends
// coverage as directories appear. A backend owns the sending half of the
// event channel, so dropping it is what tells the worker to stop.

use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::WatchError;

/// One raw notification as produced by the backend.
pub type RawEvent = notify::Result<notify::Event>;

/// Per-directory watch primitive.
pub trait WatchBackend: Send {
    /// Start watching a single directory (not its subdirectories).
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError>;

    /// Stop watching a directory.
    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError>;
}

/// The platform's recommended notify watcher.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
}

impl NotifyBackend {
    /// Create the watcher and the receiving end of its event channel.
    pub fn new() -> Result<(Self, Receiver<RawEvent>), WatchError> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx)?;
        Ok((Self { watcher }, rx))
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watcher.unwatch(dir)?;
        Ok(())
    }
}
