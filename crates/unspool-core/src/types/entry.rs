//! Archive entries as seen by the extraction engine.

use std::io::Read;
use std::path::PathBuf;

use crate::ExpandError;
use crate::Result;

/// Kind of a tar entry, reduced to what extraction cares about.
///
/// # Examples
///
/// ```
/// use unspool_core::types::EntryKind;
///
/// assert_eq!(EntryKind::from(tar::EntryType::Regular), EntryKind::File);
/// assert_eq!(EntryKind::from(tar::EntryType::XGlobalHeader), EntryKind::ExtendedHeader);
/// assert_eq!(EntryKind::from(tar::EntryType::Symlink), EntryKind::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// PAX local or global metadata record; carries no file content.
    ExtendedHeader,

    /// Links, devices, FIFOs and anything else that is not materialized.
    Other,
}

impl EntryKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

impl From<tar::EntryType> for EntryKind {
    fn from(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Regular | tar::EntryType::Continuous => Self::File,
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::XHeader | tar::EntryType::XGlobalHeader => Self::ExtendedHeader,
            _ => Self::Other,
        }
    }
}

/// Metadata of one tar entry, read lazily and dropped after use.
///
/// Timestamps are `None` when the archive does not record a time after the
/// Unix epoch; the engine substitutes the current time for those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the archive root, as stored.
    pub name: PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
    /// Declared size of the entry's content in bytes.
    pub size: u64,
    /// Permission bits from the header.
    pub mode: u32,
    /// Access time in Unix seconds.
    pub atime: Option<i64>,
    /// Modification time in Unix seconds.
    pub mtime: Option<i64>,
}

impl ArchiveEntry {
    /// Reads the metadata of a tar entry.
    ///
    /// Honors PAX `atime`/`mtime` records and the GNU atime field. Old-style
    /// regular entries whose name ends in `/` are treated as directories.
    ///
    /// Must not be called on PAX header entries themselves, since reading
    /// their extensions consumes their content.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::Format`] if the header fields cannot be parsed.
    pub fn from_tar<R: Read>(entry: &mut tar::Entry<'_, R>) -> Result<Self> {
        let name = entry.path().map_err(malformed)?.into_owned();
        let header = entry.header();

        let mut kind = EntryKind::from(header.entry_type());
        if kind.is_file() && entry.path_bytes().ends_with(b"/") {
            kind = EntryKind::Directory;
        }

        let mode = header.mode().map_err(malformed)?;
        let mut mtime = header.mtime().ok().and_then(after_epoch);
        let mut atime = header
            .as_gnu()
            .and_then(|gnu| gnu.atime().ok())
            .and_then(after_epoch);
        let size = entry.size();

        if let Some(extensions) = entry.pax_extensions().map_err(malformed)? {
            for extension in extensions {
                let extension = extension.map_err(malformed)?;
                let Ok(value) = extension.value() else {
                    continue;
                };
                match extension.key() {
                    Ok("atime") => atime = parse_pax_time(value).or(atime),
                    Ok("mtime") => mtime = parse_pax_time(value).or(mtime),
                    _ => {}
                }
            }
        }

        Ok(Self {
            name,
            kind,
            size,
            mode,
            atime,
            mtime,
        })
    }
}

fn malformed(e: std::io::Error) -> ExpandError {
    ExpandError::Format {
        format: "tar",
        reason: e.to_string(),
    }
}

fn after_epoch(secs: u64) -> Option<i64> {
    i64::try_from(secs).ok().filter(|secs| *secs > 0)
}

/// Parses the whole-second part of a PAX time such as `1700000000.25`.
fn parse_pax_time(value: &str) -> Option<i64> {
    let whole = value.split('.').next()?;
    whole.parse::<i64>().ok().filter(|secs| *secs > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;

    fn first_entry(data: &[u8]) -> ArchiveEntry {
        let mut archive = tar::Archive::new(data);
        let mut entries = archive.entries().unwrap();
        let mut entry = entries.next().unwrap().unwrap();
        ArchiveEntry::from_tar(&mut entry).unwrap()
    }

    #[test]
    fn test_entry_kind_predicates() {
        assert!(EntryKind::File.is_file());
        assert!(!EntryKind::Directory.is_file());
        assert!(!EntryKind::Other.is_file());
    }

    #[test]
    fn test_entry_kind_mapping() {
        assert_eq!(EntryKind::from(tar::EntryType::Directory), EntryKind::Directory);
        assert_eq!(EntryKind::from(tar::EntryType::XHeader), EntryKind::ExtendedHeader);
        assert_eq!(EntryKind::from(tar::EntryType::Link), EntryKind::Other);
        assert_eq!(EntryKind::from(tar::EntryType::Fifo), EntryKind::Other);
    }

    #[test]
    fn test_file_entry_metadata() {
        let data = TarTestBuilder::new()
            .add_file_with_mtime("dir/file.txt", b"hello", 1_700_000_000)
            .build();
        let entry = first_entry(&data);
        assert_eq!(entry.name, PathBuf::from("dir/file.txt"));
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 5);
        assert_eq!(entry.mode, 0o644);
        assert_eq!(entry.mtime, Some(1_700_000_000));
    }

    #[test]
    fn test_zero_timestamps_are_absent() {
        let data = TarTestBuilder::new().add_file("a.txt", b"a").build();
        let entry = first_entry(&data);
        assert_eq!(entry.mtime, None);
        assert_eq!(entry.atime, None);
    }

    #[test]
    fn test_pax_times_override_header() {
        let data = TarTestBuilder::new()
            .add_file_with_pax_times("a.txt", b"a", 1_600_000_000, 1_650_000_000)
            .build();
        let entry = first_entry(&data);
        assert_eq!(entry.atime, Some(1_600_000_000));
        assert_eq!(entry.mtime, Some(1_650_000_000));
    }

    #[test]
    fn test_parse_pax_time() {
        assert_eq!(parse_pax_time("1700000000.123456"), Some(1_700_000_000));
        assert_eq!(parse_pax_time("42"), Some(42));
        assert_eq!(parse_pax_time("0"), None);
        assert_eq!(parse_pax_time("-5.0"), None);
        assert_eq!(parse_pax_time("garbage"), None);
    }
}
