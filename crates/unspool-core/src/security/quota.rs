//! Running totals checked against [`ExpandLimits`] during one expansion.

use crate::ExpandError;
use crate::ExpandLimits;
use crate::Result;

/// Tracks entry count and declared decompressed bytes for one call.
///
/// A tracker is owned by a single expansion; it is never shared between
/// calls, so expanders stay reusable across threads.
#[derive(Debug)]
pub struct QuotaTracker {
    limits: ExpandLimits,
    entries: usize,
    bytes: u64,
}

impl QuotaTracker {
    /// Creates a tracker with zeroed totals.
    #[must_use]
    pub const fn new(limits: ExpandLimits) -> Self {
        Self {
            limits,
            entries: 0,
            bytes: 0,
        }
    }

    /// Counts one more archive entry.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::EntryCountExceeded`] when this entry crosses
    /// the limit.
    pub fn record_entry(&mut self) -> Result<()> {
        self.entries += 1;

        if let Some(limit) = self.limits.count_cap()
            && self.entries > limit
        {
            return Err(ExpandError::EntryCountExceeded {
                count: self.entries,
                limit,
            });
        }

        Ok(())
    }

    /// Adds an entry's declared size to the running byte total.
    ///
    /// Returns how many bytes this entry may still write, or `None` when
    /// unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::SizeLimitExceeded`] when the new total is over
    /// the limit.
    pub fn record_size(&mut self, size: u64) -> Result<Option<u64>> {
        let before = self.bytes;
        self.bytes = self.bytes.saturating_add(size);

        match self.limits.size_cap() {
            Some(limit) if self.bytes > limit => Err(ExpandError::SizeLimitExceeded {
                total: self.bytes,
                limit,
            }),
            Some(limit) => Ok(Some(limit - before)),
            None => Ok(None),
        }
    }

    /// Returns the number of entries counted so far.
    #[must_use]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// Returns the declared bytes counted so far.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }
}
