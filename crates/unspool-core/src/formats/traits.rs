//! Common trait for archive expanders.

use std::path::Path;

use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Result;

/// Trait implemented by every format expander.
///
/// Implementations hold only their configured limits. All per-call state
/// lives inside `expand`, so one instance may serve concurrent calls.
pub trait Expand {
    /// Expands `source` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, a safety limit is
    /// crossed, or the destination cannot be written.
    fn expand(
        &self,
        source: &Path,
        destination: &Path,
        options: &ExpandOptions,
    ) -> Result<ExtractionReport>;

    /// Returns `true` if this expander handles files named like `hint`.
    fn matches(&self, hint: &str) -> bool;

    /// Returns the expander name.
    fn name(&self) -> &'static str;
}
