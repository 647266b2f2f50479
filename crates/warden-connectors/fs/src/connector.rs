// connector.rs — FsConnector: file tools behind the path sandbox.
//
// Every operation validates its paths first and returns SandboxError
// unchanged when validation fails. Mutating operations report their own
// changes to the ResourceWatcher after the filesystem call succeeds, so the
// registry reflects them without waiting for the OS notification.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use warden_edit::{apply_edits, render_unified_diff, Edit};
use warden_sandbox::PathSandbox;
use warden_watcher::{FileEventKind, ResourceWatcher};

use crate::error::FsConnectorError;
use crate::info::FileInfo;
use crate::search::{search, walk_files, SearchQuery};

const ENTRY_SEPARATOR: &str = "\n\n---\n";

/// Sandboxed filesystem operations, wired to the resource registry.
#[derive(Clone)]
pub struct FsConnector {
    sandbox: Arc<PathSandbox>,
    watcher: Arc<ResourceWatcher>,
}

impl FsConnector {
    pub fn new(sandbox: Arc<PathSandbox>, watcher: Arc<ResourceWatcher>) -> Self {
        Self { sandbox, watcher }
    }

    /// Start a platform watcher over the sandbox roots and wrap both.
    pub fn start(sandbox: Arc<PathSandbox>) -> Result<Self, FsConnectorError> {
        let watcher = ResourceWatcher::start(Arc::clone(&sandbox))?;
        Ok(Self::new(sandbox, Arc::new(watcher)))
    }

    pub fn sandbox(&self) -> &Arc<PathSandbox> {
        &self.sandbox
    }

    pub fn watcher(&self) -> &Arc<ResourceWatcher> {
        &self.watcher
    }

    pub fn read_file(&self, path: &str) -> Result<String, FsConnectorError> {
        let path = self.sandbox.validate(path)?;
        fs::read_to_string(&path).map_err(|e| FsConnectorError::io(&path, e))
    }

    /// Read several files, or every file under the given directories.
    ///
    /// An empty list reads every allowed root. A file that cannot be read is
    /// reported inline and does not fail the batch; an invalid path does.
    pub fn read_multiple_files(&self, paths: &[String]) -> Result<String, FsConnectorError> {
        let targets: Vec<PathBuf> = if paths.is_empty() {
            self.sandbox.allowed_roots().to_vec()
        } else {
            paths
                .iter()
                .map(|p| self.sandbox.validate(p))
                .collect::<Result<_, _>>()?
        };

        let mut out = String::new();
        for target in targets {
            if target.is_dir() {
                match walk_files(&target) {
                    Ok(files) => {
                        for file in files {
                            append_file(&mut out, &file);
                        }
                    }
                    Err(e) => append_error(&mut out, &target, &e.to_string()),
                }
            } else {
                append_file(&mut out, &target);
            }
        }
        Ok(out)
    }

    /// Create or truncate a file. Returns the validated path.
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf, FsConnectorError> {
        let path = self.sandbox.validate(path)?;
        let existed = path.exists();

        fs::write(&path, content).map_err(|e| FsConnectorError::io(&path, e))?;

        let kind = if existed {
            FileEventKind::Modified
        } else {
            FileEventKind::Created
        };
        self.watcher.handle_file_event(kind, &path);
        tracing::info!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(path)
    }

    /// Move or rename a file or directory. An existing target is refused.
    pub fn move_file(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(PathBuf, PathBuf), FsConnectorError> {
        let source = self.sandbox.validate(source)?;
        let target = self.sandbox.validate(target)?;

        fs::symlink_metadata(&source).map_err(|e| FsConnectorError::io(&source, e))?;
        if fs::symlink_metadata(&target).is_ok() {
            return Err(FsConnectorError::TargetExists { path: target });
        }

        fs::rename(&source, &target).map_err(|e| FsConnectorError::io(&source, e))?;

        self.watcher.handle_file_event(FileEventKind::Deleted, &source);
        self.watcher.handle_file_event(FileEventKind::Created, &target);
        tracing::info!(from = %source.display(), to = %target.display(), "moved");
        Ok((source, target))
    }

    pub fn get_file_info(&self, path: &str) -> Result<FileInfo, FsConnectorError> {
        let path = self.sandbox.validate(path)?;
        let meta = fs::metadata(&path).map_err(|e| FsConnectorError::io(&path, e))?;
        Ok(FileInfo::from_metadata(&meta))
    }

    /// Find entries under `path` whose name matches `pattern`.
    pub fn search_files(
        &self,
        path: &str,
        pattern: &str,
        exclude_patterns: &[String],
    ) -> Result<Vec<String>, FsConnectorError> {
        let start = self.sandbox.validate(path)?;
        let query = SearchQuery::new(pattern, exclude_patterns)?;
        let found = search(&start, &query)?;
        tracing::debug!(start = %start.display(), pattern, matches = found.len(), "search finished");
        Ok(found.iter().map(|p| p.display().to_string()).collect())
    }

    /// Apply an edit batch and return the diff.
    ///
    /// A dry run never touches the file. Otherwise the file is overwritten
    /// once and exactly one `Modified` change is reported, after the write
    /// succeeds. If any edit misses, nothing is written.
    pub fn edit_file(
        &self,
        path: &str,
        edits: &[Edit],
        dry_run: bool,
    ) -> Result<String, FsConnectorError> {
        let path = self.sandbox.validate(path)?;
        let original = fs::read_to_string(&path).map_err(|e| FsConnectorError::io(&path, e))?;

        let outcome = apply_edits(&original, edits).map_err(|source| FsConnectorError::Edit {
            path: path.clone(),
            source,
        })?;

        let diff = render_unified_diff(
            &path.display().to_string(),
            &outcome.original_lines,
            &outcome.modified_lines,
        );

        if dry_run {
            tracing::debug!(path = %path.display(), edits = edits.len(), "dry-run edit");
            return Ok(diff);
        }

        fs::write(&path, &outcome.modified_content).map_err(|e| FsConnectorError::io(&path, e))?;
        self.watcher.handle_file_event(FileEventKind::Modified, &path);
        tracing::info!(path = %path.display(), edits = edits.len(), "edited file");
        Ok(diff)
    }

    /// Create a directory and any missing parents.
    pub fn create_directory(&self, path: &str) -> Result<PathBuf, FsConnectorError> {
        let path = self.sandbox.validate(path)?;
        fs::create_dir_all(&path).map_err(|e| FsConnectorError::io(&path, e))?;
        self.watcher.handle_file_event(FileEventKind::Created, &path);
        tracing::info!(path = %path.display(), "created directory");
        Ok(path)
    }

    pub fn allowed_directories(&self) -> Vec<String> {
        self.sandbox.allowed_dirs().to_vec()
    }

    pub fn resources(&self) -> BTreeMap<String, PathBuf> {
        self.watcher.resources()
    }
}

fn append_file(out: &mut String, path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => {
            let _ = write!(out, "{}:\n{}{}", path.display(), content, ENTRY_SEPARATOR);
        }
        Err(e) => append_error(out, path, &e.to_string()),
    }
}

fn append_error(out: &mut String, path: &Path, message: &str) {
    let _ = write!(out, "{}: Error - {}{}", path.display(), message, ENTRY_SEPARATOR);
}
