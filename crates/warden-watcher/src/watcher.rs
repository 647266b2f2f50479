// watcher.rs — ResourceWatcher: OS notifications → resource registry → sinks.
//
// One worker thread drains the backend channel in batches. A directory that
// appears is registered before the rest of its batch is handled, and whatever
// it already contains is reported as created, so files made together with a
// new directory are not lost. After each batch the touched directories are
// renewed: those that no longer exist leave the registration set.
//
// Tool calls report their own changes through `handle_file_event` directly,
// so the registry does not depend on the OS noticing them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};

use warden_sandbox::{normalize_lexically, PathSandbox};

use crate::backend::{NotifyBackend, RawEvent, WatchBackend};
use crate::error::WatchError;
use crate::event::{classify, resource_uri, FileEventKind, ResourceChange};
use crate::registry::{Registrations, WatchHandle};
use crate::sink::{ChannelSink, ResourceDispatcher, ResourceSink};

const WORKER_NAME: &str = "warden-watcher";

/// Live registry of what exists under the allowed roots.
///
/// Owned explicitly by whoever starts it and shared as `Arc<ResourceWatcher>`.
/// Dropping it (or calling [`shutdown`](Self::shutdown)) closes the backend
/// and joins the worker.
pub struct ResourceWatcher {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    sandbox: Arc<PathSandbox>,
    registrations: RwLock<Registrations>,
    resources: RwLock<HashMap<String, PathBuf>>,
    dispatcher: RwLock<ResourceDispatcher>,
    backend: Mutex<Option<Box<dyn WatchBackend>>>,
    next_handle: AtomicU64,
    authoritative: AtomicBool,
}

impl ResourceWatcher {
    /// Start watching every allowed root with the platform notifier.
    pub fn start(sandbox: Arc<PathSandbox>) -> Result<Self, WatchError> {
        let (backend, events) = NotifyBackend::new()?;
        Self::with_backend(sandbox, Box::new(backend), events)
    }

    /// Start with an arbitrary backend and the receiver it feeds.
    pub fn with_backend(
        sandbox: Arc<PathSandbox>,
        backend: Box<dyn WatchBackend>,
        events: Receiver<RawEvent>,
    ) -> Result<Self, WatchError> {
        let inner = Arc::new(Inner {
            sandbox,
            registrations: RwLock::new(Registrations::default()),
            resources: RwLock::new(HashMap::new()),
            dispatcher: RwLock::new(ResourceDispatcher::new()),
            backend: Mutex::new(Some(backend)),
            next_handle: AtomicU64::new(1),
            authoritative: AtomicBool::new(true),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || worker_inner.run(events))
            .map_err(WatchError::Spawn)?;

        for root in inner.sandbox.allowed_roots() {
            inner.register_tree(root);
        }

        tracing::info!(
            directories = read(&inner.registrations).len(),
            "resource watcher started"
        );

        Ok(Self {
            inner,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Record a change and notify every sink on the calling thread.
    ///
    /// Paths outside every allowed root are logged and discarded.
    pub fn handle_file_event(&self, kind: FileEventKind, path: &Path) {
        self.inner.handle_file_event(kind, path);
    }

    pub fn subscribe(&self, sink: Box<dyn ResourceSink>) {
        write(&self.inner.dispatcher).add_sink(sink);
    }

    /// Subscribe an in-process channel and return its receiving end.
    pub fn channel(&self) -> Receiver<ResourceChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribe(Box::new(ChannelSink::new(tx)));
        rx
    }

    /// Snapshot of the registry, keyed by URI.
    pub fn resources(&self) -> BTreeMap<String, PathBuf> {
        read(&self.inner.resources)
            .iter()
            .map(|(uri, path)| (uri.clone(), path.clone()))
            .collect()
    }

    pub fn contains_resource(&self, uri: &str) -> bool {
        read(&self.inner.resources).contains_key(uri)
    }

    pub fn registered_directories(&self) -> Vec<PathBuf> {
        read(&self.inner.registrations).directories()
    }

    pub fn is_registered(&self, dir: &Path) -> bool {
        read(&self.inner.registrations).contains(dir)
    }

    /// False once the backend has reported an overflow; the registry may
    /// have missed changes from then on.
    pub fn is_authoritative(&self) -> bool {
        self.inner.authoritative.load(Ordering::Acquire)
    }

    pub fn sandbox(&self) -> &Arc<PathSandbox> {
        &self.inner.sandbox
    }

    /// Close the backend and wait for the worker to exit. Idempotent.
    pub fn shutdown(&self) {
        let backend = lock(&self.inner.backend).take();
        if backend.is_none() {
            return;
        }
        drop(backend);

        if let Some(worker) = lock(&self.worker).take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                tracing::warn!("resource watcher worker panicked");
            }
        }
        tracing::info!("resource watcher stopped");
    }
}

impl Drop for ResourceWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn run(&self, events: Receiver<RawEvent>) {
        while let Ok(first) = events.recv() {
            if self.is_closed() {
                break;
            }
            let mut batch = vec![first];
            batch.extend(events.try_iter());
            self.process_batch(batch);
        }
        tracing::debug!("resource watcher worker exiting");
    }

    fn is_closed(&self) -> bool {
        lock(&self.backend).is_none()
    }

    fn process_batch(&self, batch: Vec<RawEvent>) {
        let mut touched = BTreeSet::new();

        for raw in batch {
            let event = match raw {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "watch backend error");
                    continue;
                }
            };

            if event.need_rescan() {
                tracing::warn!("watch queue overflowed, resource registry is now advisory");
                self.authoritative.store(false, Ordering::Release);
                continue;
            }

            for (kind, path) in classify(&event) {
                let path = normalize_lexically(&path);
                if let Some(parent) = path.parent() {
                    touched.insert(parent.to_path_buf());
                }
                if kind == FileEventKind::Deleted {
                    touched.insert(path.clone());
                }

                self.handle_file_event(kind, &path);

                if kind == FileEventKind::Created
                    && path.is_dir()
                    && self.sandbox.is_allowed(&path)
                {
                    self.register_new_directory(&path);
                }
            }
        }

        for dir in touched {
            self.renew(&dir);
        }
    }

    fn handle_file_event(&self, kind: FileEventKind, path: &Path) {
        let path = self.sandbox.resolve(path);
        if !self.sandbox.is_allowed(&path) {
            tracing::warn!(path = %path.display(), kind = %kind, "event outside allowed directories discarded");
            return;
        }

        let change = ResourceChange::new(kind, &path);
        {
            let mut resources = write(&self.resources);
            match kind {
                FileEventKind::Created | FileEventKind::Modified => {
                    resources.insert(change.uri.clone(), path.clone());
                }
                // Also purges everything beneath a deleted directory.
                FileEventKind::Deleted => resources.retain(|_, p| !p.starts_with(&path)),
            }
        }

        tracing::info!(kind = %kind, uri = %change.uri, "resource changed");
        read(&self.dispatcher).dispatch(&change);
    }

    /// Register a freshly created directory tree and report what it already
    /// holds.
    fn register_new_directory(&self, dir: &Path) {
        for child in self.register_tree(dir) {
            self.handle_file_event(FileEventKind::Created, &child);
        }
    }

    /// Register `top` and every directory beneath it. Returns every entry
    /// found below `top`, parents before children.
    fn register_tree(&self, top: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![top.to_path_buf()];

        while let Some(dir) = pending.pop() {
            self.register_directory(&dir);

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "failed to scan directory");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                // Symlinked directories are not followed.
                if entry.file_type().is_ok_and(|t| t.is_dir()) {
                    pending.push(path.clone());
                }
                found.push(path);
            }
        }

        found
    }

    fn register_directory(&self, dir: &Path) {
        let mut backend = lock(&self.backend);
        let Some(backend) = backend.as_mut() else {
            tracing::debug!(path = %dir.display(), "watcher closed, registration skipped");
            return;
        };

        if read(&self.registrations).contains(dir) {
            return;
        }

        if let Err(e) = backend.watch(dir) {
            tracing::warn!(path = %dir.display(), error = %e, "failed to register directory");
            return;
        }

        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        write(&self.registrations).insert(handle, dir.to_path_buf());
        tracing::debug!(path = %dir.display(), handle = %handle, "registered directory");
    }

    /// Drop `dir` (and everything registered beneath it) once it is gone.
    fn renew(&self, dir: &Path) {
        if dir.is_dir() || !read(&self.registrations).contains(dir) {
            return;
        }

        let removed = write(&self.registrations).remove_subtree(dir);
        let mut backend = lock(&self.backend);
        for (handle, path) in removed {
            if let Some(backend) = backend.as_mut() {
                // The OS usually drops the watch itself when the directory goes.
                if let Err(e) = backend.unwatch(&path) {
                    tracing::debug!(path = %path.display(), error = %e, "unwatch failed");
                }
            }
            tracing::info!(path = %path.display(), handle = %handle, uri = %resource_uri(&path), "dropped registration for removed directory");
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
