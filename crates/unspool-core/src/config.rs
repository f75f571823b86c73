//! Limits and per-call options for archive expansion.

use crate::cancel::CancelToken;
use crate::formats::compression::CompressionCodec;

/// Resource ceilings an expander enforces on every call.
///
/// A value of `0` disables the corresponding check. Limits are immutable
/// configuration; the running totals they are compared against live only
/// inside a single expansion call.
///
/// # Examples
///
/// ```
/// use unspool_core::ExpandLimits;
///
/// // No limits at all
/// let open = ExpandLimits::default();
/// assert_eq!(open.size_cap(), None);
///
/// // Customize for untrusted input
/// let strict = ExpandLimits::default()
///     .with_file_size_limit(100 * 1024 * 1024)
///     .with_files_limit(1_000);
/// assert_eq!(strict.count_cap(), Some(1_000));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandLimits {
    /// Maximum cumulative decompressed bytes for one call (`0` = unlimited).
    pub file_size_limit: u64,

    /// Maximum number of archive entries for one call (`0` = unlimited).
    pub files_limit: usize,
}

impl ExpandLimits {
    /// Creates limits with explicit values.
    #[must_use]
    pub const fn new(file_size_limit: u64, files_limit: usize) -> Self {
        Self {
            file_size_limit,
            files_limit,
        }
    }

    /// Conservative limits for archives from untrusted sources.
    ///
    /// - `file_size_limit`: 500 MB
    /// - `files_limit`: 10,000
    #[must_use]
    pub const fn recommended() -> Self {
        Self {
            file_size_limit: 500 * 1024 * 1024,
            files_limit: 10_000,
        }
    }

    /// Sets the cumulative decompressed byte ceiling.
    #[must_use]
    pub const fn with_file_size_limit(mut self, limit: u64) -> Self {
        self.file_size_limit = limit;
        self
    }

    /// Sets the entry count ceiling.
    #[must_use]
    pub const fn with_files_limit(mut self, limit: usize) -> Self {
        self.files_limit = limit;
        self
    }

    /// The byte ceiling, or `None` when unlimited.
    #[must_use]
    pub const fn size_cap(&self) -> Option<u64> {
        if self.file_size_limit > 0 {
            Some(self.file_size_limit)
        } else {
            None
        }
    }

    /// The entry ceiling, or `None` when unlimited.
    #[must_use]
    pub const fn count_cap(&self) -> Option<usize> {
        if self.files_limit > 0 {
            Some(self.files_limit)
        } else {
            None
        }
    }
}

/// What the destination path is expected to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestinationMode {
    /// The destination is a directory root holding the archive's tree.
    #[default]
    Directory,
    /// The destination is exactly one output file.
    SingleFile,
}

impl DestinationMode {
    /// Maps the classic `dir` flag onto a mode.
    #[must_use]
    pub const fn from_dir_flag(dir: bool) -> Self {
        if dir { Self::Directory } else { Self::SingleFile }
    }

    /// Returns `true` for [`DestinationMode::Directory`].
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Default permission mask for created directories and files.
pub const DEFAULT_PERMISSION_MASK: u32 = 0o755;

/// Options for a single expansion call.
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Whether the destination is a directory tree or a single file.
    pub mode: DestinationMode,

    /// Creation mode for new directories; archive modes are ANDed with it.
    pub permission_mask: u32,

    /// Cancellation signal polled between entries and between chunks.
    pub cancel: CancelToken,

    /// Forces the tar decoder stack; `None` picks it from the source name.
    pub codec: Option<CompressionCodec>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            mode: DestinationMode::Directory,
            permission_mask: DEFAULT_PERMISSION_MASK,
            cancel: CancelToken::new(),
            codec: None,
        }
    }
}

impl ExpandOptions {
    /// Options for expanding into a directory tree.
    #[must_use]
    pub fn directory() -> Self {
        Self::default()
    }

    /// Options for expanding into exactly one file.
    #[must_use]
    pub fn single_file() -> Self {
        Self {
            mode: DestinationMode::SingleFile,
            ..Self::default()
        }
    }

    /// Sets the permission mask.
    #[must_use]
    pub fn with_permission_mask(mut self, mask: u32) -> Self {
        self.permission_mask = mask;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Forces a codec for tar-family sources.
    #[must_use]
    pub fn with_codec(mut self, codec: Option<CompressionCodec>) -> Self {
        self.codec = codec;
        self
    }
}
