//! Tar extraction engine.
//!
//! Streams entries out of a decoded tar stream one at a time. Every entry is
//! counted, path-checked and size-checked against its declared header size
//! before any of its content is read. Directory metadata is queued and applied
//! after the last entry.

use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use filetime::FileTime;

use crate::DestinationMode;
use crate::ExpandError;
use crate::ExpandLimits;
use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Mismatch;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_bounded;
use crate::security::QuotaTracker;
use crate::security::path::check_existing_within_root;
use crate::security::sanitize_permissions;
use crate::security::validate_entry_name;
use crate::types::ArchiveEntry;
use crate::types::EntryKind;

use super::dirs::DirFixup;
use super::dirs::DirFixups;
use super::dirs::apply_times;
use super::dirs::create_dirs;
use super::dirs::entry_times;

/// Extracts a decoded tar stream into `destination`.
///
/// In [`DestinationMode::Directory`] `destination` is the root of the output
/// tree and is created, if missing, once the first entry passes its checks.
/// In [`DestinationMode::SingleFile`] it is the literal output path and the
/// archive must hold exactly one regular file.
///
/// # Errors
///
/// Fails on the first offending entry; files written before the failure are
/// left in place.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::path::Path;
/// use unspool_core::ExpandLimits;
/// use unspool_core::ExpandOptions;
/// use unspool_core::extraction::extract_tar;
///
/// # fn main() -> Result<(), unspool_core::ExpandError> {
/// let file = File::open("bundle.tar")?;
/// let report = extract_tar(
///     file,
///     Path::new("/tmp/out"),
///     ExpandLimits::recommended(),
///     &ExpandOptions::directory(),
/// )?;
/// println!("{} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_tar<R: Read>(
    reader: R,
    destination: &Path,
    limits: ExpandLimits,
    options: &ExpandOptions,
) -> Result<ExtractionReport> {
    ExtractionEngine::new(destination, limits, options).run(reader)
}

/// Per-call extraction state.
///
/// All running totals live here, so one engine serves exactly one
/// extraction and expanders holding only limits remain shareable.
pub struct ExtractionEngine<'a> {
    destination: PathBuf,
    options: &'a ExpandOptions,
    quota: QuotaTracker,
    fixups: DirFixups,
    buffer: CopyBuffer,
    report: ExtractionReport,
    root_ready: bool,
    file_written: bool,
    now: FileTime,
}

impl<'a> ExtractionEngine<'a> {
    /// Creates an engine for one extraction into `destination`.
    #[must_use]
    pub fn new(destination: &Path, limits: ExpandLimits, options: &'a ExpandOptions) -> Self {
        Self {
            destination: destination.to_path_buf(),
            options,
            quota: QuotaTracker::new(limits),
            fixups: DirFixups::new(),
            buffer: CopyBuffer::new(),
            report: ExtractionReport::new(),
            root_ready: false,
            file_written: false,
            now: FileTime::now(),
        }
    }

    /// Drives the tar stream to completion.
    ///
    /// # Errors
    ///
    /// - [`ExpandError::Format`] if the tar stream is malformed
    /// - [`ExpandError::PathEscape`] for traversal or absolute entry names
    /// - [`ExpandError::EntryCountExceeded`] / [`ExpandError::SizeLimitExceeded`]
    ///   when a limit is crossed
    /// - [`ExpandError::StructureMismatch`] for an empty archive, or a layout
    ///   that does not fit [`DestinationMode::SingleFile`]
    /// - [`ExpandError::Write`] / [`ExpandError::Metadata`] on filesystem
    ///   failures
    /// - [`ExpandError::Cancelled`] if the options' token fires
    pub fn run<R: Read>(mut self, reader: R) -> Result<ExtractionReport> {
        let start = Instant::now();

        let mut archive = tar::Archive::new(reader);
        for entry in archive.entries().map_err(malformed)? {
            self.options.cancel.check()?;
            let mut entry = entry.map_err(malformed)?;

            if EntryKind::from(entry.header().entry_type()) == EntryKind::ExtendedHeader {
                tracing::debug!("Skipping extended header {}", display_raw(&entry));
                continue;
            }

            let meta = ArchiveEntry::from_tar(&mut entry)?;
            self.process(&mut entry, &meta)?;
        }

        self.finish(start)
    }

    fn mode(&self) -> DestinationMode {
        self.options.mode
    }

    fn process<R: Read>(&mut self, content: &mut R, entry: &ArchiveEntry) -> Result<()> {
        self.quota.record_entry()?;

        let relative = validate_entry_name(&entry.name)?;
        let target = match self.mode() {
            DestinationMode::Directory => self.destination.join(&relative),
            DestinationMode::SingleFile => self.destination.clone(),
        };

        let budget = self.quota.record_size(entry.size)?;
        self.ensure_root()?;

        match entry.kind {
            EntryKind::Directory => self.write_directory(entry, target),
            EntryKind::File => self.write_file(content, entry, &target, budget),
            EntryKind::ExtendedHeader | EntryKind::Other => {
                tracing::warn!(
                    "Skipping unsupported entry type {}",
                    entry.name.display()
                );
                self.report.entries_skipped += 1;
                self.report
                    .add_warning(format!("skipped unsupported entry: {}", entry.name.display()));
                Ok(())
            }
        }
    }

    fn ensure_root(&mut self) -> Result<()> {
        if !self.root_ready && self.mode().is_directory() {
            create_dirs(&self.destination, self.options.permission_mask)?;
            self.root_ready = true;
        }
        Ok(())
    }

    fn write_directory(&mut self, entry: &ArchiveEntry, target: PathBuf) -> Result<()> {
        if !self.mode().is_directory() {
            return Err(ExpandError::StructureMismatch(
                Mismatch::UnexpectedDirectory {
                    path: entry.name.clone(),
                },
            ));
        }

        check_existing_within_root(&target, &self.destination)?;
        create_dirs(&target, self.options.permission_mask)?;
        tracing::debug!("Created directory {}", target.display());

        let (atime, mtime) = self.times_for(entry);
        self.fixups.push(DirFixup {
            path: target,
            mode: sanitize_permissions(entry.mode, self.options.permission_mask),
            atime,
            mtime,
        });
        self.report.directories_created += 1;
        Ok(())
    }

    fn write_file<R: Read>(
        &mut self,
        content: &mut R,
        entry: &ArchiveEntry,
        target: &Path,
        budget: Option<u64>,
    ) -> Result<()> {
        match self.mode() {
            DestinationMode::Directory => {
                check_existing_within_root(target, &self.destination)?;
            }
            DestinationMode::SingleFile => {
                if self.file_written {
                    return Err(ExpandError::StructureMismatch(Mismatch::MultipleFiles));
                }
            }
        }

        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dirs(parent, self.options.permission_mask)?;
        }

        let mode = sanitize_permissions(entry.mode, self.options.permission_mask);
        let written = copy_bounded(
            content,
            target,
            mode,
            budget,
            &mut self.buffer,
            &self.options.cancel,
        )?;

        let (atime, mtime) = self.times_for(entry);
        apply_times(target, atime, mtime)?;

        tracing::debug!("Extracted {} ({written} bytes)", target.display());
        self.file_written = true;
        self.report.files_extracted += 1;
        self.report.bytes_written = self.report.bytes_written.saturating_add(written);
        Ok(())
    }

    fn times_for(&self, entry: &ArchiveEntry) -> (FileTime, FileTime) {
        if entry.mtime.is_none() {
            tracing::debug!(
                "No usable mtime for {}, using current time",
                entry.name.display()
            );
        }
        entry_times(entry, self.now)
    }

    fn finish(mut self, start: Instant) -> Result<ExtractionReport> {
        if self.quota.entries() == 0 {
            return Err(ExpandError::StructureMismatch(Mismatch::EmptyArchive));
        }
        if !self.mode().is_directory() && !self.file_written {
            return Err(ExpandError::StructureMismatch(Mismatch::EmptyArchive));
        }

        let fixups = std::mem::take(&mut self.fixups);
        if !fixups.is_empty() {
            tracing::debug!("Applying metadata to {} directories", fixups.len());
        }
        fixups.apply()?;

        self.report.duration = start.elapsed();
        tracing::info!(
            "Extracted {} entries ({} files, {} directories, {} bytes of {} declared) to {}",
            self.report.total_items(),
            self.report.files_extracted,
            self.report.directories_created,
            self.report.bytes_written,
            self.quota.bytes(),
            self.destination.display()
        );
        Ok(self.report)
    }
}

fn malformed(e: std::io::Error) -> ExpandError {
    ExpandError::Format {
        format: "tar",
        reason: e.to_string(),
    }
}

fn display_raw<R: Read>(entry: &tar::Entry<'_, R>) -> String {
    String::from_utf8_lossy(&entry.path_bytes()).into_owned()
}
