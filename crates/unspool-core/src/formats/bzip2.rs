//! Single-file bzip2 expander.
//!
//! A bare bzip2 stream has no file tree and no declared uncompressed size,
//! so output is capped by checking the running total after every chunk.

use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use ::bzip2::read::MultiBzDecoder;

use crate::ExpandError;
use crate::ExpandLimits;
use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::copy::create_truncated;
use crate::copy::set_mode;
use crate::extraction::create_dirs;
use crate::security::contains_parent_traversal;
use crate::security::expand_home;

use super::traits::Expand;

/// Mode for the decompressed file before masking.
const OUTPUT_MODE: u32 = 0o644;

/// Expander for a lone bzip2-compressed file.
///
/// Only [`DestinationMode::SingleFile`](crate::DestinationMode::SingleFile)
/// is supported. Only the size limit applies; there are no entries to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bzip2Expander {
    limits: ExpandLimits,
}

impl Bzip2Expander {
    /// Creates a bzip2 expander with the given limits.
    #[must_use]
    pub const fn new(limits: ExpandLimits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ExpandLimits {
        self.limits
    }
}

impl Expand for Bzip2Expander {
    fn expand(
        &self,
        source: &Path,
        destination: &Path,
        options: &ExpandOptions,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let source = expand_home(source)?;
        let destination = expand_home(destination)?;

        if options.mode.is_directory() {
            return Err(ExpandError::UnsupportedMode {
                expander: "bzip2",
                reason: "a bzip2 stream can only be expanded to a single file",
            });
        }

        let file = File::open(&source).map_err(|e| ExpandError::Open {
            path: source.clone(),
            source: e,
        })?;

        let output = output_path(&source, &destination);
        if contains_parent_traversal(&output) {
            return Err(ExpandError::PathEscape { path: output });
        }

        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dirs(parent, options.permission_mask)?;
        }

        let mode = OUTPUT_MODE & options.permission_mask;
        let mut decoder = MultiBzDecoder::new(BufReader::new(file));
        let mut writer = BufWriter::new(create_truncated(&output, mode)?);
        let mut buffer = CopyBuffer::new();

        let written = copy_with_buffer(
            &mut decoder,
            &mut writer,
            &mut buffer,
            self.limits.size_cap(),
            &options.cancel,
            &output,
        )
        .map_err(|e| match e {
            ExpandError::Format { reason, .. } => ExpandError::Format {
                format: "bzip2",
                reason,
            },
            other => other,
        })?;

        writer.flush().map_err(|e| ExpandError::write(&output, e))?;
        drop(writer);
        set_mode(&output, mode)?;

        tracing::info!(
            "Decompressed {} to {} ({written} bytes)",
            source.display(),
            output.display()
        );

        Ok(ExtractionReport {
            files_extracted: 1,
            bytes_written: written,
            duration: start.elapsed(),
            ..ExtractionReport::default()
        })
    }

    fn matches(&self, hint: &str) -> bool {
        (hint.contains("bz2") || hint.contains("bzip2")) && !hint.contains("tar")
    }

    fn name(&self) -> &'static str {
        "bzip2"
    }
}

/// Resolves the output file; an existing directory destination receives the
/// source's name without its `.bz2` suffix.
fn output_path(source: &Path, destination: &Path) -> PathBuf {
    if !destination.is_dir() {
        return destination.to_path_buf();
    }

    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_suffix(".bz2")
        .or_else(|| name.strip_suffix(".bzip2"))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(&name);

    destination.join(stem)
}
