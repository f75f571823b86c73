//! Error types for archive expansion.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExpandError`.
pub type Result<T> = std::result::Result<T, ExpandError>;

/// The way an archive's layout disagrees with the requested destination mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The archive holds no extractable entries.
    EmptyArchive,
    /// A directory entry was found while extracting to a single file.
    UnexpectedDirectory {
        /// Name of the directory entry inside the archive.
        path: PathBuf,
    },
    /// More than one file entry was found while extracting to a single file.
    MultipleFiles,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArchive => write!(f, "empty archive"),
            Self::UnexpectedDirectory { path } => {
                write!(f, "expected a file, got a directory: {}", path.display())
            }
            Self::MultipleFiles => write!(f, "archive contains more than one file"),
        }
    }
}

/// Errors that can occur while expanding an archive.
///
/// Every error is terminal for the call that produced it. Files written
/// before the failure are left in place.
#[derive(Error, Debug)]
pub enum ExpandError {
    /// The source archive could not be opened or read.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// The source path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The compressed or archived stream is malformed.
    #[error("malformed {format} stream: {reason}")]
    Format {
        /// Name of the format being decoded.
        format: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A path would resolve outside of the destination root.
    #[error("path escapes destination: {}", path.display())]
    PathEscape {
        /// The offending path or entry name.
        path: PathBuf,
    },

    /// Cumulative decompressed bytes went over the configured ceiling.
    #[error("decompressed size {total} exceeds the {limit} byte limit")]
    SizeLimitExceeded {
        /// Running total at the point of failure.
        total: u64,
        /// Configured ceiling.
        limit: u64,
    },

    /// The archive holds more entries than allowed.
    #[error("archive contains more entries than the {limit} allowed (reached {count})")]
    EntryCountExceeded {
        /// Entry count at the point of failure.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// The archive layout does not fit the destination mode.
    #[error("{0}")]
    StructureMismatch(Mismatch),

    /// A destination directory or file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Permission or timestamp fix-up failed.
    #[error("failed to update metadata of {}: {source}", path.display())]
    Metadata {
        /// The path whose metadata could not be set.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The expander cannot honor the requested destination mode.
    #[error("{expander} cannot expand in this mode: {reason}")]
    UnsupportedMode {
        /// Name of the expander.
        expander: &'static str,
        /// Why the mode is rejected.
        reason: &'static str,
    },

    /// No registered expander handles the given file.
    #[error("no expander registered for {}", path.display())]
    UnsupportedFormat {
        /// The file that could not be matched.
        path: PathBuf,
    },

    /// A leading `~` could not be expanded.
    #[error("could not determine the home directory to expand {}", path.display())]
    HomeDirUnavailable {
        /// The path that started with `~`.
        path: PathBuf,
    },

    /// The caller cancelled the operation.
    #[error("expansion cancelled")]
    Cancelled,

    /// I/O operation failed outside of any more specific category.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExpandError {
    /// Returns `true` if this error was raised by one of the attack defenses:
    /// path escape, decompression bomb or archive bomb.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use unspool_core::ExpandError;
    ///
    /// let err = ExpandError::PathEscape {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    /// assert!(!ExpandError::Cancelled.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathEscape { .. }
                | Self::SizeLimitExceeded { .. }
                | Self::EntryCountExceeded { .. }
        )
    }

    /// Returns the path this error is about, if it concerns one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Open { path, .. }
            | Self::PathEscape { path }
            | Self::Write { path, .. }
            | Self::Metadata { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::HomeDirUnavailable { path } => Some(path),
            Self::StructureMismatch(Mismatch::UnexpectedDirectory { path }) => Some(path),
            _ => None,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn metadata(path: &Path, source: std::io::Error) -> Self {
        Self::Metadata {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_mentions_limit() {
        let err = ExpandError::SizeLimitExceeded {
            total: 1000,
            limit: 500,
        };
        let display = err.to_string();
        assert!(display.contains("500"));
        assert!(display.contains("1000"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_entry_count_error() {
        let err = ExpandError::EntryCountExceeded { count: 4, limit: 3 };
        let display = err.to_string();
        assert!(display.contains("more entries than the 3 allowed"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_mismatch_display() {
        assert_eq!(
            ExpandError::StructureMismatch(Mismatch::EmptyArchive).to_string(),
            "empty archive"
        );
        assert_eq!(
            Mismatch::MultipleFiles.to_string(),
            "archive contains more than one file"
        );
        let err = ExpandError::StructureMismatch(Mismatch::UnexpectedDirectory {
            path: PathBuf::from("docs/"),
        });
        assert!(err.to_string().contains("got a directory: docs/"));
        assert_eq!(err.path(), Some(Path::new("docs/")));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_path_escape_error() {
        let err = ExpandError::PathEscape {
            path: PathBuf::from("../../etc/passwd"),
        };
        assert!(err.to_string().contains("escapes destination"));
        assert_eq!(err.path(), Some(Path::new("../../etc/passwd")));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExpandError = io_err.into();
        assert!(matches!(err, ExpandError::Io(_)));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_write_error_source_chain() {
        use std::error::Error;

        let err = ExpandError::write(
            Path::new("out/file.txt"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("out/file.txt"));
    }
}
