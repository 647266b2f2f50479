// search.rs — Glob search over a directory tree.
//
// The match pattern is tested against each entry's *name*. Exclude patterns
// are tested against the path relative to the search start; an excluded
// directory is not descended into. Entries are visited in name order, parents
// before children.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::FsConnectorError;

// `*` must not cross `/` when matching relative exclude paths.
const EXCLUDE_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: Pattern,
    excludes: Vec<Pattern>,
}

impl SearchQuery {
    pub fn new(pattern: &str, excludes: &[String]) -> Result<Self, FsConnectorError> {
        Ok(Self {
            pattern: compile(pattern)?,
            excludes: excludes
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
        })
    }

    fn matches_name(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches_path_with(relative, EXCLUDE_OPTIONS))
    }
}

fn compile(pattern: &str) -> Result<Pattern, FsConnectorError> {
    Pattern::new(pattern).map_err(|source| FsConnectorError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Walk `start` and return every entry whose name matches.
///
/// The start itself is a candidate. An exclude pattern matching its (empty)
/// relative path prunes the whole walk. Unreadable subdirectories are logged
/// and skipped; an unreadable start is an error.
pub fn search(start: &Path, query: &SearchQuery) -> Result<Vec<PathBuf>, FsConnectorError> {
    let meta = fs::metadata(start).map_err(|e| FsConnectorError::io(start, e))?;
    let mut found = Vec::new();
    if query.is_excluded(Path::new("")) {
        return Ok(found);
    }
    if query.matches_name(start) {
        found.push(start.to_path_buf());
    }

    if meta.is_dir() {
        let entries = sorted_entries(start).map_err(|e| FsConnectorError::io(start, e))?;
        visit(start, entries, query, &mut found);
    }
    Ok(found)
}

fn visit(start: &Path, entries: Vec<fs::DirEntry>, query: &SearchQuery, found: &mut Vec<PathBuf>) {
    for entry in entries {
        let path = entry.path();
        let relative = path.strip_prefix(start).unwrap_or(&path);
        if query.is_excluded(relative) {
            continue;
        }
        if query.matches_name(&path) {
            found.push(path.clone());
        }

        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            match sorted_entries(&path) {
                Ok(children) => visit(start, children, query, found),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory")
                }
            }
        }
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Every regular file beneath `dir`, in walk order.
pub fn walk_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            files.extend(walk_files(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
