//! Expansion operation reporting.

use std::time::Duration;

/// Report of an archive expansion.
///
/// Contains statistics about what one `expand` call materialized.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Number of entries that were counted but not materialized
    /// (links, devices, FIFOs).
    pub entries_skipped: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the expansion.
    pub duration: Duration,

    /// Warnings generated during expansion.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns total number of entries processed, skipped ones included.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.entries_skipped
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
