//! Archive format implementations.
//!
//! Expanders form a closed set, so the registry stores [`Expander`] values
//! and dispatches with a `match` instead of trait objects.

pub mod bzip2;
pub mod compression;
pub mod detect;
pub mod tar;
pub mod traits;

use std::path::Path;

use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Result;

pub use self::bzip2::Bzip2Expander;
pub use self::compression::CompressionCodec;
pub use self::detect::MagicFormat;
pub use self::detect::sniff_format;
pub use self::tar::TarExpander;
pub use self::traits::Expand;

/// A registered expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expander {
    /// Tar, tar.gz and tar.bz2.
    Tar(TarExpander),
    /// Single-file bzip2.
    Bzip2(Bzip2Expander),
}

impl Expand for Expander {
    fn expand(
        &self,
        source: &Path,
        destination: &Path,
        options: &ExpandOptions,
    ) -> Result<ExtractionReport> {
        match self {
            Self::Tar(expander) => expander.expand(source, destination, options),
            Self::Bzip2(expander) => expander.expand(source, destination, options),
        }
    }

    fn matches(&self, hint: &str) -> bool {
        match self {
            Self::Tar(expander) => expander.matches(hint),
            Self::Bzip2(expander) => expander.matches(hint),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Tar(expander) => expander.name(),
            Self::Bzip2(expander) => expander.name(),
        }
    }
}

impl From<TarExpander> for Expander {
    fn from(expander: TarExpander) -> Self {
        Self::Tar(expander)
    }
}

impl From<Bzip2Expander> for Expander {
    fn from(expander: Bzip2Expander) -> Self {
        Self::Bzip2(expander)
    }
}
