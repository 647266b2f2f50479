// info.rs — FileInfo: metadata snapshot returned by get_file_info.

use std::fmt;
use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub size: u64,
    /// `None` where the platform does not record the time.
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub is_directory: bool,
    pub is_file: bool,
    /// `rwxr-xr-x` style on Unix, `N/A` elsewhere.
    pub permissions: String,
}

impl FileInfo {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            size: meta.len(),
            created: meta.created().ok().map(to_utc),
            modified: meta.modified().ok().map(to_utc),
            accessed: meta.accessed().ok().map(to_utc),
            is_directory: meta.is_dir(),
            is_file: meta.is_file(),
            permissions: permissions_string(meta),
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: {} bytes", self.size)?;
        writeln!(f, "Created: {}", format_time(self.created))?;
        writeln!(f, "Modified: {}", format_time(self.modified))?;
        writeln!(f, "Accessed: {}", format_time(self.accessed))?;
        writeln!(f, "Is Directory: {}", self.is_directory)?;
        writeln!(f, "Is File: {}", self.is_file)?;
        write!(f, "Permissions: {}", self.permissions)
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(unix)]
fn permissions_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let flags = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    flags
        .iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

#[cfg(not(unix))]
fn permissions_string(_meta: &Metadata) -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_metadata_is_captured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        let info = FileInfo::from_metadata(&fs::metadata(&path).unwrap());
        assert_eq!(info.size, 5);
        assert!(info.is_file);
        assert!(!info.is_directory);
        assert!(info.modified.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn unix_permissions_render_as_rwx() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "#!/bin/sh").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        let info = FileInfo::from_metadata(&fs::metadata(&path).unwrap());
        assert_eq!(info.permissions, "rwxr-x---");
    }

    #[test]
    fn display_lists_every_field() {
        let dir = tempdir().unwrap();
        let info = FileInfo::from_metadata(&fs::metadata(dir.path()).unwrap());
        let text = info.to_string();

        assert!(text.starts_with("Size: "));
        assert!(text.contains("Is Directory: true"));
        assert!(text.contains("Is File: false"));
        assert!(text.contains("Permissions: "));
    }

    #[test]
    fn missing_time_renders_as_na() {
        assert_eq!(format_time(None), "N/A");
    }
}
