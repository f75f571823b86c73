//! High-level public API for archive expansion.

use std::path::Path;

use crate::DestinationMode;
use crate::ExpandLimits;
use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Registry;
use crate::Result;

/// Expands an archive with the default expanders.
///
/// The expander is chosen from the file name, falling back to the file's
/// magic number. Permission mask and cancellation use their defaults; build a
/// [`Registry`] and [`ExpandOptions`] directly for finer control.
///
/// # Errors
///
/// Returns an error if:
/// - No expander handles the source
/// - The source cannot be opened or decoded
/// - A path, size or entry-count check fails
/// - The destination cannot be written
///
/// # Examples
///
/// ```no_run
/// use unspool_core::DestinationMode;
/// use unspool_core::ExpandLimits;
/// use unspool_core::expand_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = expand_archive(
///     "policy.tar.gz",
///     "/tmp/policy",
///     DestinationMode::Directory,
///     ExpandLimits::recommended(),
/// )?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn expand_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    mode: DestinationMode,
    limits: ExpandLimits,
) -> Result<ExtractionReport> {
    let options = ExpandOptions {
        mode,
        ..ExpandOptions::default()
    };
    Registry::with_defaults(limits).expand(source.as_ref(), destination.as_ref(), &options)
}
