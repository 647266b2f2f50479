// normalize.rs — Lexical path normalization.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// Symlinks are not resolved. A `..` at the root of an absolute path stays at
/// the root (`/..` → `/`); a leading `..` on a relative path is kept so the
/// result still means the same thing once joined onto a base.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_dot_segments() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(normalize_lexically(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn relative_leading_parents_are_kept() {
        assert_eq!(normalize_lexically(Path::new("../x/./y")), PathBuf::from("../x/y"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn trailing_separator_is_dropped() {
        assert_eq!(normalize_lexically(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }
}
