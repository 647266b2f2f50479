// sandbox.rs — PathSandbox: the single gate every incoming path goes through.
//
// Resolution order for `validate`:
//   1. host → container remap (identity when not configured)
//   2. resolve against the working directory
//   3. lexical normalization of `.` / `..` (symlinks are NOT resolved)
//   4. component-wise prefix match against every allowed root
//
// The root list is fixed at construction; after that the sandbox is
// immutable and can be shared across threads without locking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::normalize::normalize_lexically;
use crate::remap::PathRemap;

/// Validates and normalizes paths against a fixed set of allowed roots.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    /// Roots as configured (reported back to callers verbatim).
    allowed_dirs: Vec<String>,

    /// Absolute, normalized roots used for containment checks.
    roots: Vec<PathBuf>,

    /// Optional host → container prefix mapping.
    remap: Option<PathRemap>,

    /// Base for resolving relative input.
    working_dir: PathBuf,
}

impl PathSandbox {
    /// Build a sandbox from config, creating any missing root directory.
    ///
    /// Fails if no roots are configured or if a root exists as something
    /// other than a directory.
    pub fn new(config: &SandboxConfig) -> Result<Self, SandboxError> {
        if config.allowed_dirs.is_empty() {
            return Err(SandboxError::Config(
                "no allowed directories configured".to_string(),
            ));
        }

        let working_dir = match &config.working_dir {
            Some(dir) => normalize_lexically(dir),
            None => {
                let cwd = std::env::current_dir().map_err(|source| SandboxError::Io {
                    path: PathBuf::from("."),
                    source,
                })?;
                normalize_lexically(&cwd)
            }
        };

        let mut roots = Vec::with_capacity(config.allowed_dirs.len());
        for dir in &config.allowed_dirs {
            let root = normalize_lexically(&working_dir.join(dir));
            ensure_root_directory(&root)?;
            roots.push(root);
        }

        let remap = config
            .remap_pair()
            .map(|(host, container)| PathRemap::new(host, container));

        tracing::info!(
            roots = ?roots,
            remap = remap.is_some(),
            "path sandbox initialized"
        );

        Ok(Self {
            allowed_dirs: config.allowed_dirs.clone(),
            roots,
            remap,
            working_dir,
        })
    }

    /// Validate an incoming path and return its absolute, normalized form.
    pub fn validate(&self, input: &str) -> Result<PathBuf, SandboxError> {
        if input.contains('\0') {
            return Err(self.denied(input));
        }

        let remapped = self.to_container_path(input);
        let path = self.resolve(Path::new(&remapped));

        if self.is_allowed(&path) {
            Ok(path)
        } else {
            tracing::warn!(input = %input, resolved = %path.display(), "path rejected by sandbox");
            Err(self.denied(&remapped))
        }
    }

    /// Pure containment predicate for an absolute, normalized path.
    pub fn is_allowed(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    /// Allowed roots as configured, in order.
    pub fn allowed_dirs(&self) -> &[String] {
        &self.allowed_dirs
    }

    /// Allowed roots as absolute, normalized paths, in order.
    pub fn allowed_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// The directory relative input is resolved against.
    pub fn current_working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Host → container translation; identity when remap is not configured.
    pub fn to_container_path(&self, host_path: &str) -> String {
        match &self.remap {
            Some(remap) => remap.to_container_path(host_path),
            None => host_path.to_string(),
        }
    }

    /// Absolute, lexically normalized form of `path` (no containment check).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_lexically(path)
        } else {
            normalize_lexically(&self.working_dir.join(path))
        }
    }

    fn denied(&self, path: &str) -> SandboxError {
        SandboxError::AccessDenied {
            path: path.to_string(),
            allowed: self.allowed_dirs.clone(),
        }
    }
}

fn ensure_root_directory(root: &Path) -> Result<(), SandboxError> {
    if root.exists() {
        if !root.is_dir() {
            return Err(SandboxError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        return Ok(());
    }

    fs::create_dir_all(root).map_err(|source| SandboxError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    tracing::info!(root = %root.display(), "created missing allowed root");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sandbox_for(dirs: &[&Path]) -> PathSandbox {
        let joined = dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(",");
        let config = SandboxConfig::from_allowed_dirs(&joined).unwrap();
        PathSandbox::new(&config).unwrap()
    }

    #[test]
    fn path_inside_root_is_returned_normalized() {
        let dir = tempdir().unwrap();
        let sandbox = sandbox_for(&[dir.path()]);

        let input = format!("{}/a/./b/../c.txt", dir.path().display());
        let validated = sandbox.validate(&input).unwrap();

        assert_eq!(validated, dir.path().join("a/c.txt"));
        assert!(validated.is_absolute());
        assert!(!validated
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir | std::path::Component::CurDir)));
    }

    #[test]
    fn root_itself_is_allowed() {
        let dir = tempdir().unwrap();
        let sandbox = sandbox_for(&[dir.path()]);
        let input = dir.path().display().to_string();
        assert_eq!(sandbox.validate(&input).unwrap(), dir.path());
    }

    #[test]
    fn dot_dot_escape_is_denied() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        let sandbox = sandbox_for(&[&root]);

        let input = format!("{}/sub/../../secret.txt", root.display());
        let err = sandbox.validate(&input).unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn nested_root_escape_is_denied() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("outer/inner");
        let sandbox = sandbox_for(&[&inner]);

        // Climbing from the inner root into its parent must be rejected even
        // though the parent exists and contains the root.
        let input = format!("{}/../sibling.txt", inner.display());
        assert!(sandbox.validate(&input).unwrap_err().is_access_denied());
    }

    #[test]
    fn any_root_grants_access() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let sandbox = sandbox_for(&[a.path(), b.path()]);

        let in_b = format!("{}/file", b.path().display());
        assert!(sandbox.validate(&in_b).is_ok());
    }

    #[test]
    fn sibling_sharing_a_name_prefix_is_denied() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        let sandbox = sandbox_for(&[&root]);

        let input = format!("{}/data2/file", dir.path().display());
        assert!(sandbox.validate(&input).unwrap_err().is_access_denied());
    }

    #[test]
    fn relative_input_resolves_against_working_dir() {
        let dir = tempdir().unwrap();
        let config = SandboxConfig::from_allowed_dirs(&dir.path().display().to_string())
            .unwrap()
            .with_working_dir(dir.path());
        let sandbox = PathSandbox::new(&config).unwrap();

        assert_eq!(
            sandbox.validate("notes/today.md").unwrap(),
            dir.path().join("notes/today.md")
        );
        assert!(sandbox.validate("../escape").unwrap_err().is_access_denied());
        assert_eq!(sandbox.current_working_dir(), dir.path());
    }

    #[test]
    fn nul_byte_is_folded_into_access_denied() {
        let dir = tempdir().unwrap();
        let sandbox = sandbox_for(&[dir.path()]);
        let input = format!("{}/a\0b", dir.path().display());
        assert!(sandbox.validate(&input).unwrap_err().is_access_denied());
    }

    #[test]
    fn missing_root_is_created() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("fresh/root");
        assert!(!root.exists());

        let sandbox = sandbox_for(&[&root]);
        assert!(root.is_dir());
        assert_eq!(sandbox.allowed_roots(), &[root]);
    }

    #[test]
    fn file_as_root_fails_startup() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let config = SandboxConfig::from_allowed_dirs(&file.display().to_string()).unwrap();
        let err = PathSandbox::new(&config).unwrap_err();
        assert!(matches!(err, SandboxError::NotADirectory { .. }));
    }

    #[test]
    fn empty_config_fails_startup() {
        let err = PathSandbox::new(&SandboxConfig::default()).unwrap_err();
        assert!(matches!(err, SandboxError::Config(_)));
    }

    #[test]
    fn remap_runs_before_containment() {
        let dir = tempdir().unwrap();
        let container = dir.path().join("container");
        let config = SandboxConfig::from_allowed_dirs(&container.display().to_string())
            .unwrap()
            .with_remap("/home/someone/ws", container.display().to_string());
        let sandbox = PathSandbox::new(&config).unwrap();

        let validated = sandbox.validate("/home/someone/ws/src/lib.rs").unwrap();
        assert_eq!(validated, container.join("src/lib.rs"));

        // Outside the host workspace: passes through and fails containment.
        assert!(sandbox
            .validate("/home/someone/elsewhere")
            .unwrap_err()
            .is_access_denied());
    }

    #[test]
    fn to_container_path_is_identity_without_remap() {
        let dir = tempdir().unwrap();
        let sandbox = sandbox_for(&[dir.path()]);
        assert_eq!(sandbox.to_container_path("/any/path"), "/any/path");
    }

    #[test]
    fn denial_message_lists_allowed_dirs() {
        let dir = tempdir().unwrap();
        let sandbox = sandbox_for(&[dir.path()]);
        let msg = sandbox.validate("/definitely/outside").unwrap_err().to_string();
        assert!(msg.contains("access denied"));
        assert!(msg.contains(&dir.path().display().to_string()));
    }
}
