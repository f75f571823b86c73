//! Directory creation and deferred directory metadata fix-up.
//!
//! Tar places a directory's header before its children, and writing a child
//! file bumps the directory's mtime. Directory modes and times are therefore
//! queued during the main pass and applied once every file is written.

use std::path::Path;
use std::path::PathBuf;

use filetime::FileTime;

use crate::ExpandError;
use crate::Result;
use crate::copy::set_mode;
use crate::types::ArchiveEntry;

/// Creates `path` and any missing parents with `mode` (`mkdir -p`).
///
/// Succeeds if the directory already exists.
pub(crate) fn create_dirs(path: &Path, mode: u32) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).map_err(|e| ExpandError::write(path, e))
}

/// Access and modification times for an entry, with `now` substituted for
/// times the archive does not record.
pub(crate) fn entry_times(entry: &ArchiveEntry, now: FileTime) -> (FileTime, FileTime) {
    let to_time = |secs: Option<i64>| secs.map_or(now, |secs| FileTime::from_unix_time(secs, 0));
    (to_time(entry.atime), to_time(entry.mtime))
}

/// Sets access and modification times on `path`.
pub(crate) fn apply_times(path: &Path, atime: FileTime, mtime: FileTime) -> Result<()> {
    filetime::set_file_times(path, atime, mtime).map_err(|e| ExpandError::metadata(path, e))
}

/// Metadata owed to one directory once the main pass is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFixup {
    /// Directory on disk.
    pub path: PathBuf,
    /// Sanitized mode to apply.
    pub mode: u32,
    /// Access time to apply.
    pub atime: FileTime,
    /// Modification time to apply.
    pub mtime: FileTime,
}

/// Ordered queue of directory fix-ups owned by one extraction.
#[derive(Debug, Default)]
pub struct DirFixups {
    pending: Vec<DirFixup>,
}

impl DirFixups {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a fix-up.
    pub fn push(&mut self, fixup: DirFixup) {
        self.pending.push(fixup);
    }

    /// Returns the number of queued fix-ups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies every queued mode and timestamp in the order queued.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::Metadata`] for the first directory that cannot
    /// be updated.
    pub fn apply(self) -> Result<()> {
        for fixup in self.pending {
            set_mode(&fixup.path, fixup.mode)?;
            apply_times(&fixup.path, fixup.atime, fixup.mtime)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use tempfile::TempDir;

    fn entry(atime: Option<i64>, mtime: Option<i64>) -> ArchiveEntry {
        ArchiveEntry {
            name: PathBuf::from("dir/"),
            kind: EntryKind::Directory,
            size: 0,
            mode: 0o755,
            atime,
            mtime,
        }
    }

    #[test]
    fn test_create_dirs_idempotent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        create_dirs(&nested, 0o755).unwrap();
        create_dirs(&nested, 0o755).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_create_dirs_over_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            create_dirs(&file.join("sub"), 0o755),
            Err(ExpandError::Write { .. })
        ));
    }

    #[test]
    fn test_entry_times_fall_back_to_now() {
        let now = FileTime::from_unix_time(1_800_000_000, 0);
        let (atime, mtime) = entry_times(&entry(None, Some(1_000)), now);
        assert_eq!(atime, now);
        assert_eq!(mtime, FileTime::from_unix_time(1_000, 0));
    }

    #[test]
    fn test_fixups_apply_times_in_order() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("outer");
        let inner = outer.join("inner");
        create_dirs(&inner, 0o755).unwrap();

        let mut fixups = DirFixups::new();
        for path in [&outer, &inner] {
            fixups.push(DirFixup {
                path: path.clone(),
                mode: 0o750,
                atime: FileTime::from_unix_time(1_000_000, 0),
                mtime: FileTime::from_unix_time(2_000_000, 0),
            });
        }
        assert_eq!(fixups.len(), 2);
        fixups.apply().unwrap();

        for path in [&outer, &inner] {
            let meta = std::fs::metadata(path).unwrap();
            assert_eq!(
                FileTime::from_last_modification_time(&meta),
                FileTime::from_unix_time(2_000_000, 0)
            );
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                assert_eq!(meta.permissions().mode() & 0o777, 0o750);
            }
        }
    }

    #[test]
    fn test_fixup_on_missing_dir_is_metadata_error() {
        let temp = TempDir::new().unwrap();
        let mut fixups = DirFixups::new();
        fixups.push(DirFixup {
            path: temp.path().join("gone"),
            mode: 0o755,
            atime: FileTime::now(),
            mtime: FileTime::now(),
        });
        assert!(matches!(fixups.apply(), Err(ExpandError::Metadata { .. })));
    }
}
