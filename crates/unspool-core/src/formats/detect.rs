//! Archive format detection by magic number.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::ExpandError;
use crate::Result;

/// Bytes read from the start of a file when sniffing.
const SNIFF_LEN: usize = 10;

/// Formats recognizable by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagicFormat {
    /// Gzip stream.
    Gzip,
    /// ZIP archive.
    Zip,
    /// Tar archive whose first bytes carry the `ustar` marker.
    Tar,
    /// Bzip2 stream.
    Bzip2,
    /// XZ stream.
    Xz,
    /// 7z archive.
    SevenZ,
}

/// Signatures in match priority order; the first matching prefix wins.
const MAGIC_NUMBERS: [(MagicFormat, &[u8]); 6] = [
    (MagicFormat::Gzip, &[0x1f, 0x8b]),
    (MagicFormat::Zip, &[0x50, 0x4b, 0x03, 0x04]),
    (MagicFormat::Tar, &[0x75, 0x73, 0x74, 0x61, 0x72]),
    (MagicFormat::Bzip2, &[0x42, 0x5a, 0x68]),
    (MagicFormat::Xz, &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]),
    (MagicFormat::SevenZ, &[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c]),
];

impl MagicFormat {
    /// Returns the conventional format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::SevenZ => "7z",
        }
    }

    /// Returns an extension hint that expander matchers understand.
    ///
    /// A bare gzip stream is assumed to wrap a tar archive.
    #[must_use]
    pub const fn extension_hint(self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
            Self::SevenZ => "7z",
        }
    }

    /// Returns the first format whose signature prefixes `header`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unspool_core::formats::detect::MagicFormat;
    ///
    /// assert_eq!(MagicFormat::from_header(b"BZh91AY&SY"), Some(MagicFormat::Bzip2));
    /// assert_eq!(MagicFormat::from_header(b"plain text"), None);
    /// ```
    #[must_use]
    pub fn from_header(header: &[u8]) -> Option<Self> {
        MAGIC_NUMBERS
            .iter()
            .find(|(_, magic)| header.starts_with(magic))
            .map(|(format, _)| *format)
    }
}

impl std::fmt::Display for MagicFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads the first bytes of `path` and matches them against known
/// signatures.
///
/// Returns `Ok(None)` when the file is readable but not archive-like.
///
/// # Errors
///
/// Returns [`ExpandError::Open`] if the file cannot be opened, or is empty.
pub fn sniff_format(path: &Path) -> Result<Option<MagicFormat>> {
    let open_error = |source| ExpandError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(open_error)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .map_err(open_error)?;

    if header.is_empty() {
        return Err(open_error(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "could not read file header",
        )));
    }

    Ok(MagicFormat::from_header(&header))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils;
    use tempfile::TempDir;

    fn sniff_bytes(data: &[u8]) -> Result<Option<MagicFormat>> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob");
        std::fs::write(&path, data).unwrap();
        sniff_format(&path)
    }

    #[test]
    fn test_sniff_gzip() {
        let data = test_utils::gzip(b"payload");
        assert_eq!(sniff_bytes(&data).unwrap(), Some(MagicFormat::Gzip));
    }

    #[test]
    fn test_sniff_bzip2() {
        let data = test_utils::bzip2(b"payload");
        assert_eq!(sniff_bytes(&data).unwrap(), Some(MagicFormat::Bzip2));
    }

    #[test]
    fn test_sniff_short_signatures() {
        assert_eq!(
            MagicFormat::from_header(&[0x50, 0x4b, 0x03, 0x04, 0x14]),
            Some(MagicFormat::Zip)
        );
        assert_eq!(
            MagicFormat::from_header(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, 0x00]),
            Some(MagicFormat::Xz)
        );
        assert_eq!(
            MagicFormat::from_header(&[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c]),
            Some(MagicFormat::SevenZ)
        );
        assert_eq!(MagicFormat::from_header(b"ustar\0"), Some(MagicFormat::Tar));
    }

    #[test]
    fn test_sniff_file_shorter_than_window() {
        assert_eq!(sniff_bytes(&[0x1f, 0x8b]).unwrap(), Some(MagicFormat::Gzip));
        assert_eq!(sniff_bytes(b"BZ").unwrap(), None);
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(sniff_bytes(b"hello, world").unwrap(), None);
    }

    #[test]
    fn test_sniff_empty_file_is_error() {
        assert!(matches!(sniff_bytes(b""), Err(ExpandError::Open { .. })));
    }

    #[test]
    fn test_sniff_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = sniff_format(&temp.path().join("absent"));
        assert!(matches!(result, Err(ExpandError::Open { .. })));
    }

    #[test]
    fn test_priority_is_table_order() {
        for (format, magic) in MAGIC_NUMBERS {
            assert_eq!(MagicFormat::from_header(magic), Some(format));
        }
    }

    #[test]
    fn test_display_and_hints() {
        assert_eq!(MagicFormat::SevenZ.to_string(), "7z");
        assert_eq!(MagicFormat::Gzip.extension_hint(), "tar.gz");
        assert_eq!(MagicFormat::Bzip2.extension_hint(), "bz2");
    }
}
