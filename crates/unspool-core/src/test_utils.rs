//! Test utilities for building in-memory archives.
//!
//! Provides builders for well-formed and deliberately malicious tar streams
//! plus gzip/bzip2 helpers, so unit tests, integration tests and benches
//! share one way of producing fixtures.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Write;

/// Creates an in-memory TAR archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are created with mode 0o644.
///
/// # Examples
///
/// ```
/// use unspool_core::test_utils::create_test_tar;
///
/// let tar_data = create_test_tar(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(TarTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Gzip-compresses `data`.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Bzip2-compresses `data`.
#[must_use]
pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builder for TAR test archives with various entry types.
///
/// # Examples
///
/// ```
/// use unspool_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_directory("dir/")
///     .add_file("dir/file.txt", b"content")
///     .add_raw_entry("../escape.txt", b"evil")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644 and a zero timestamp.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file with a modification time in Unix seconds.
    #[must_use]
    pub fn add_file_with_mtime(mut self, path: &str, data: &[u8], mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file preceded by a PAX record carrying `atime`/`mtime`.
    #[must_use]
    pub fn add_file_with_pax_times(mut self, path: &str, data: &[u8], atime: u64, mtime: u64) -> Self {
        let atime = atime.to_string();
        let mtime = mtime.to_string();
        self.builder
            .append_pax_extensions([("atime", atime.as_bytes()), ("mtime", mtime.as_bytes())])
            .unwrap();
        self.add_file(path, data)
    }

    /// Adds a directory with mode 0o755.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_meta(path, 0o755, 0)
    }

    /// Adds a directory with custom mode and modification time.
    #[must_use]
    pub fn add_directory_with_meta(mut self, path: &str, mode: u32, mtime: u64) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(mode);
        header.set_mtime(mtime);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a PAX global extended header.
    #[must_use]
    pub fn add_pax_global_header(mut self) -> Self {
        let record = b"19 comment=unspool\n";
        let mut header = tar::Header::new_ustar();
        header.set_size(record.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::XGlobalHeader);
        header.set_cksum();
        self.builder
            .append_data(&mut header, "pax_global_header", &record[..])
            .unwrap();
        self
    }

    /// Adds a regular file whose name is written verbatim into the header.
    ///
    /// Bypasses the `tar` crate's path sanitization so names such as
    /// `../../etc/passwd` or `/etc/passwd` can be produced. Names must fit
    /// the 100-byte legacy name field.
    #[must_use]
    pub fn add_raw_entry(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        let field = &mut header.as_old_mut().name;
        field[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a regular file header that declares `declared` bytes while only
    /// `data` follows, to exercise limits checked against header sizes.
    #[must_use]
    pub fn add_file_declaring(mut self, path: &str, declared: u64, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_path(path).unwrap();
        header.set_size(declared);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tar() {
        let tar_data = create_test_tar(vec![("file.txt", b"hello")]);
        assert!(!tar_data.is_empty());
        assert_eq!(tar_data.len() % 512, 0);
    }

    #[test]
    fn test_raw_entry_keeps_name() {
        let tar_data = TarTestBuilder::new()
            .add_raw_entry("../../etc/passwd", b"root")
            .build();
        let mut archive = tar::Archive::new(&tar_data[..]);
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path_bytes().as_ref(), b"../../etc/passwd");
    }

    #[test]
    fn test_compression_helpers_produce_magic() {
        assert!(gzip(b"x").starts_with(&[0x1f, 0x8b]));
        assert!(bzip2(b"x").starts_with(b"BZh"));
    }
}
