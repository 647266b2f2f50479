//! # warden-watcher
//!
//! Resource registry for Warden, kept current by filesystem notifications.
//!
//! The watcher registers each allowed root and every directory beneath it
//! with a non-recursive OS watch, extends itself as directories are created,
//! and drops registrations when directories disappear. Every change, whether
//! reported by the OS or by a tool call, updates the registry and is handed
//! to the subscribed sinks.
//!
//! ## Key components
//!
//! - [`ResourceWatcher`] — owned instance: worker thread, registry, sinks
//! - [`ResourceSink`] — subscriber trait; [`JsonlSink`] and [`ChannelSink`] provided
//! - [`WatchBackend`] — per-directory watch primitive ([`NotifyBackend`] in production)
//! - [`ResourceChange`] — `{ kind, uri, path, timestamp }` record sent to sinks

pub mod backend;
pub mod error;
pub mod event;
pub mod registry;
pub mod sink;
pub mod watcher;

pub use backend::{NotifyBackend, RawEvent, WatchBackend};
pub use error::WatchError;
pub use event::{classify, resource_uri, FileEventKind, ResourceChange};
pub use registry::WatchHandle;
pub use sink::{ChannelSink, JsonlSink, ResourceDispatcher, ResourceSink};
pub use watcher::ResourceWatcher;
