//! Decompression stages placed in front of the tar decoder.
//!
//! # Supported Codecs
//!
//! - **None** (.tar): raw tar bytes
//! - **Gzip** (.tar.gz, .tgz)
//! - **Bzip2** (.tar.bz2, .tbz2)

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;

use crate::ExpandError;
use crate::Result;

/// Gzip member header magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression wrapped around a tar stream.
///
/// # Examples
///
/// ```
/// use unspool_core::formats::compression::CompressionCodec;
///
/// assert_eq!(CompressionCodec::from_file_name("pkg.tgz"), CompressionCodec::Gzip);
/// assert_eq!(CompressionCodec::from_file_name("pkg.tar.bz2"), CompressionCodec::Bzip2);
/// assert_eq!(CompressionCodec::from_file_name("pkg.tar"), CompressionCodec::None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    /// Plain tar.
    None,
    /// Gzip (deflate), possibly multi-member.
    Gzip,
    /// Bzip2, possibly multi-stream.
    Bzip2,
}

impl CompressionCodec {
    /// Picks the codec from substrings of a file name.
    ///
    /// `tar.gz`/`tgz` select gzip, `tar.bz2`/`tbz2` select bzip2, anything
    /// else is plain tar. This is a name heuristic, not content sniffing.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("tar.gz") || name.contains("tgz") {
            Self::Gzip
        } else if name.contains("tar.bz2") || name.contains("tbz2") {
            Self::Bzip2
        } else {
            Self::None
        }
    }

    /// Returns a human-readable name for this codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }

    /// Wraps `reader` in the decompressor for this codec.
    ///
    /// Gzip input is checked for its magic bytes up front so a malformed
    /// header fails here rather than midway through the tar decoder.
    ///
    /// # Errors
    ///
    /// - [`ExpandError::Format`] if a gzip stream does not start with a gzip
    ///   header
    /// - [`ExpandError::Io`] if the header cannot be read
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> Result<Box<dyn Read + 'a>> {
        match self {
            Self::None => Ok(Box::new(reader)),
            Self::Gzip => {
                let mut buffered = BufReader::new(reader);
                let head = buffered.fill_buf()?;
                if !head.starts_with(&GZIP_MAGIC) {
                    return Err(ExpandError::Format {
                        format: self.name(),
                        reason: "invalid gzip header".into(),
                    });
                }
                Ok(Box::new(flate2::bufread::MultiGzDecoder::new(buffered)))
            }
            Self::Bzip2 => Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader))),
        }
    }
}
