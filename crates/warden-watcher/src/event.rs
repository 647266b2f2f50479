// event.rs — Change kinds and the ResourceChange record delivered to sinks.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use serde::{Deserialize, Serialize};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileEventKind::Created => "created",
            FileEventKind::Modified => "modified",
            FileEventKind::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A single registry change, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub kind: FileEventKind,
    pub uri: String,
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
}

impl ResourceChange {
    pub fn new(kind: FileEventKind, path: &Path) -> Self {
        Self {
            kind,
            uri: resource_uri(path),
            path: path.to_path_buf(),
            timestamp: Utc::now(),
        }
    }
}

/// Registry key for an absolute path: `file://` followed by the path.
pub fn resource_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Reduce a backend event to `(kind, path)` pairs.
///
/// Renames are split into a delete of the old name and a create of the new
/// one. Access and unclassified events carry no registry meaning and yield
/// nothing.
pub fn classify(event: &notify::Event) -> Vec<(FileEventKind, PathBuf)> {
    let tag = |kind: FileEventKind| -> Vec<(FileEventKind, PathBuf)> {
        event.paths.iter().map(|p| (kind, p.clone())).collect()
    };

    match event.kind {
        EventKind::Create(_) => tag(FileEventKind::Created),
        EventKind::Remove(_) => tag(FileEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => tag(FileEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => tag(FileEventKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                out.push((FileEventKind::Deleted, from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                out.push((FileEventKind::Created, to.clone()));
            }
            out
        }
        // Backends that cannot tell which side of a rename they saw.
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() {
                    FileEventKind::Created
                } else {
                    FileEventKind::Deleted
                };
                (kind, p.clone())
            })
            .collect(),
        EventKind::Modify(_) => tag(FileEventKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
