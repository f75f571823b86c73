//! Safe expansion of tar, tar.gz, tar.bz2 and bzip2 archives.
//!
//! `unspool-core` materializes untrusted archives on disk while defending
//! against path traversal ("zip-slip"), decompression bombs and archive
//! bombs. Expanders are chosen from a [`Registry`] by file name or magic
//! number; tar-family expanders share one streaming extraction engine.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use unspool_core::ExpandLimits;
//! use unspool_core::ExpandOptions;
//! use unspool_core::Registry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::with_defaults(ExpandLimits::recommended());
//! let report = registry.expand(
//!     Path::new("bundle.tar.gz"),
//!     Path::new("/output/dir"),
//!     &ExpandOptions::directory(),
//! )?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cancel;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod registry;
pub mod report;
pub mod security;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::expand_archive;
pub use cancel::CancelToken;
pub use config::DestinationMode;
pub use config::ExpandLimits;
pub use config::ExpandOptions;
pub use error::ExpandError;
pub use error::Mismatch;
pub use error::Result;
pub use formats::Bzip2Expander;
pub use formats::Expand;
pub use formats::Expander;
pub use formats::TarExpander;
pub use registry::Registry;
pub use report::ExtractionReport;
