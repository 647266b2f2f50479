// remap.rs — Host ↔ container path translation.
//
// When the server runs inside a container, the agent usually reports paths as
// they look on the host. PathRemap rewrites the host workspace prefix to the
// container workspace prefix. It is not a security boundary: anything outside
// the host workspace passes through untouched and is left for the containment
// check to reject.

use std::path::{Path, PathBuf};

use crate::normalize::normalize_lexically;

/// A host-workspace → container-workspace prefix mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRemap {
    host_root: PathBuf,
    container_root: PathBuf,
}

impl PathRemap {
    pub fn new(host_root: impl AsRef<Path>, container_root: impl AsRef<Path>) -> Self {
        Self {
            host_root: normalize_lexically(host_root.as_ref()),
            container_root: normalize_lexically(container_root.as_ref()),
        }
    }

    pub fn host_root(&self) -> &Path {
        &self.host_root
    }

    pub fn container_root(&self) -> &Path {
        &self.container_root
    }

    /// Translate a host path into its container equivalent.
    ///
    /// Any path under the host root has that prefix replaced. When the
    /// container root is itself nested in the host root, paths already under
    /// the container root are returned as-is so the translation stays
    /// idempotent.
    pub fn to_container_path(&self, host_path: &str) -> String {
        let normalized = normalize_lexically(Path::new(host_path));

        if self.container_root.starts_with(&self.host_root)
            && normalized.starts_with(&self.container_root)
        {
            return host_path.to_string();
        }

        match normalized.strip_prefix(&self.host_root) {
            Ok(relative) => {
                let mapped = normalize_lexically(&self.container_root.join(relative));
                mapped.to_string_lossy().into_owned()
            }
            Err(_) => host_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remap() -> PathRemap {
        PathRemap::new("/home/dev/project", "/workspace")
    }

    #[test]
    fn host_prefix_is_replaced() {
        assert_eq!(
            remap().to_container_path("/home/dev/project/src/main.rs"),
            "/workspace/src/main.rs"
        );
    }

    #[test]
    fn host_root_itself_maps_to_container_root() {
        assert_eq!(remap().to_container_path("/home/dev/project"), "/workspace");
    }

    #[test]
    fn dot_segments_are_collapsed_before_matching() {
        assert_eq!(
            remap().to_container_path("/home/dev/other/../project/./a.txt"),
            "/workspace/a.txt"
        );
    }

    #[test]
    fn outside_host_root_passes_through_unchanged() {
        assert_eq!(remap().to_container_path("/etc/passwd"), "/etc/passwd");
        assert_eq!(remap().to_container_path("relative/file"), "relative/file");
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_remapped() {
        // Component-wise matching: "project2" is not under "project".
        assert_eq!(
            remap().to_container_path("/home/dev/project2/x"),
            "/home/dev/project2/x"
        );
    }

    #[test]
    fn translation_is_idempotent() {
        let r = remap();
        let once = r.to_container_path("/home/dev/project/lib/a.rs");
        assert_eq!(r.to_container_path(&once), once);
    }

    #[test]
    fn idempotent_when_container_root_is_nested_in_host_root() {
        let r = PathRemap::new("/mnt", "/mnt/container");
        let once = r.to_container_path("/mnt/data/file");
        assert_eq!(once, "/mnt/container/data/file");
        assert_eq!(r.to_container_path(&once), once);
    }

    #[test]
    fn host_root_nested_in_container_root_is_still_remapped() {
        let r = PathRemap::new("/ws/host", "/ws");
        assert_eq!(r.to_container_path("/ws/host/a.txt"), "/ws/a.txt");
        assert_eq!(r.to_container_path("/ws/host"), "/ws");
        // Container paths outside the host root pass through.
        assert_eq!(r.to_container_path("/ws/a.txt"), "/ws/a.txt");
    }
}
