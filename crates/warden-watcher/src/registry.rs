// registry.rs — Watch registrations: handle ↔ directory.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identifier for one directory registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(pub u64);

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch#{}", self.0)
    }
}

/// Both directions of the registration map. The reverse index keeps
/// registration idempotent per directory.
#[derive(Debug, Default)]
pub struct Registrations {
    by_handle: HashMap<WatchHandle, PathBuf>,
    by_path: HashMap<PathBuf, WatchHandle>,
}

impl Registrations {
    pub fn insert(&mut self, handle: WatchHandle, dir: PathBuf) {
        self.by_path.insert(dir.clone(), handle);
        self.by_handle.insert(handle, dir);
    }

    pub fn handle_for(&self, dir: &Path) -> Option<WatchHandle> {
        self.by_path.get(dir).copied()
    }

    pub fn directory_for(&self, handle: WatchHandle) -> Option<&Path> {
        self.by_handle.get(&handle).map(PathBuf::as_path)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.by_path.contains_key(dir)
    }

    /// Remove `dir` and every registration beneath it, returning what was
    /// removed.
    pub fn remove_subtree(&mut self, dir: &Path) -> Vec<(WatchHandle, PathBuf)> {
        let doomed: Vec<PathBuf> = self
            .by_path
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect();

        doomed
            .into_iter()
            .filter_map(|p| {
                let handle = self.by_path.remove(&p)?;
                self.by_handle.remove(&handle);
                Some((handle, p))
            })
            .collect()
    }

    /// Registered directories, sorted.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.by_path.keys().cloned().collect();
        dirs.sort();
        dirs
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_both_ways() {
        let mut regs = Registrations::default();
        regs.insert(WatchHandle(1), PathBuf::from("/ws"));

        assert_eq!(regs.handle_for(Path::new("/ws")), Some(WatchHandle(1)));
        assert_eq!(regs.directory_for(WatchHandle(1)), Some(Path::new("/ws")));
        assert!(regs.contains(Path::new("/ws")));
    }

    #[test]
    fn remove_subtree_takes_descendants_but_not_siblings() {
        let mut regs = Registrations::default();
        regs.insert(WatchHandle(1), PathBuf::from("/ws"));
        regs.insert(WatchHandle(2), PathBuf::from("/ws/a"));
        regs.insert(WatchHandle(3), PathBuf::from("/ws/a/b"));
        regs.insert(WatchHandle(4), PathBuf::from("/ws/ab"));

        let mut removed = regs.remove_subtree(Path::new("/ws/a"));
        removed.sort();
        assert_eq!(
            removed,
            vec![
                (WatchHandle(2), PathBuf::from("/ws/a")),
                (WatchHandle(3), PathBuf::from("/ws/a/b")),
            ]
        );
        assert_eq!(
            regs.directories(),
            vec![PathBuf::from("/ws"), PathBuf::from("/ws/ab")]
        );
        assert!(regs.directory_for(WatchHandle(3)).is_none());
    }

    #[test]
    fn handle_displays_with_prefix() {
        assert_eq!(WatchHandle(7).to_string(), "watch#7");
    }
}
