//! # warden-connector-fs
//!
//! Filesystem tools for Warden.
//!
//! Bridges tool calls (read, write, move, search, edit) to the real
//! filesystem through three gates: the [`PathSandbox`](warden_sandbox::PathSandbox)
//! validates every path, the edit engine computes replacements and diffs in
//! memory, and the [`ResourceWatcher`](warden_watcher::ResourceWatcher) is told
//! about every change the tools make.
//!
//! ## Flow
//!
//! 1. Agent calls [`FsConnector::edit_file`] → path validated, file read
//! 2. Edits applied in memory; any miss aborts with nothing written
//! 3. Diff rendered; on a real run the file is overwritten once
//! 4. One `Modified` change reaches every subscribed sink

pub mod connector;
pub mod error;
pub mod info;
pub mod search;

pub use connector::FsConnector;
pub use error::FsConnectorError;
pub use info::FileInfo;
pub use search::SearchQuery;
