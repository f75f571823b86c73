//! Bounded, cancellable stream copying with a reusable buffer.
//!
//! Both the tar engine and the single-file bzip2 expander funnel their
//! decompressed bytes through [`copy_with_buffer`]. The buffer lives on the
//! stack and is reused across entries of one expansion call.

use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::Path;

use crate::CancelToken;
use crate::ExpandError;
use crate::Result;

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stack-allocated buffer for efficient file copying.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zero-initialized copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer` chunk by chunk.
///
/// When `ceiling` is set, the running total is checked after each chunk is
/// read and before it is written: a chunk that would take the total past the
/// ceiling fails with [`ExpandError::SizeLimitExceeded`] and is never
/// written. `cancel` is polled after every chunk.
///
/// `sink` names the destination in write errors.
///
/// # Errors
///
/// - [`ExpandError::Format`] if the source yields corrupt data
/// - [`ExpandError::Write`] if writing to `writer` fails
/// - [`ExpandError::SizeLimitExceeded`] if `ceiling` would be exceeded
/// - [`ExpandError::Cancelled`] if `cancel` fires mid-stream
///
/// # Examples
///
/// ```
/// # use std::io::Cursor;
/// # use std::path::Path;
/// use unspool_core::CancelToken;
/// use unspool_core::copy::{CopyBuffer, copy_with_buffer};
///
/// # fn main() -> Result<(), unspool_core::ExpandError> {
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let total = copy_with_buffer(
///     &mut Cursor::new(b"payload"),
///     &mut output,
///     &mut buffer,
///     Some(1024),
///     &CancelToken::new(),
///     Path::new("memory"),
/// )?;
/// assert_eq!(total, 7);
/// # Ok(())
/// # }
/// ```
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    ceiling: Option<u64>,
    cancel: &CancelToken,
    sink: &Path,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        cancel.check()?;

        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e, sink)),
        };

        let next = total.saturating_add(bytes_read as u64);
        if let Some(limit) = ceiling
            && next > limit
        {
            return Err(ExpandError::SizeLimitExceeded { total: next, limit });
        }

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(|e| ExpandError::write(sink, e))?;
        total = next;
    }

    Ok(total)
}

/// Streams `reader` into the file at `destination`, then sets its mode.
///
/// The file is created or truncated. When `max_bytes` is set the reader is
/// wrapped in a limiting adapter that silently stops at the cap; callers that
/// must *detect* oversized input track their own totals.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// - [`ExpandError::Write`] if the file cannot be created or written
/// - [`ExpandError::Metadata`] if the mode cannot be applied
/// - [`ExpandError::Format`] if the source yields corrupt data
/// - [`ExpandError::Cancelled`] if `cancel` fires mid-stream
pub fn copy_bounded<R: Read>(
    reader: R,
    destination: &Path,
    mode: u32,
    max_bytes: Option<u64>,
    buffer: &mut CopyBuffer,
    cancel: &CancelToken,
) -> Result<u64> {
    let file = create_truncated(destination, mode)?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);

    let written = match max_bytes {
        Some(limit) => copy_with_buffer(
            &mut reader.take(limit),
            &mut writer,
            buffer,
            None,
            cancel,
            destination,
        )?,
        None => {
            let mut reader = reader;
            copy_with_buffer(&mut reader, &mut writer, buffer, None, cancel, destination)?
        }
    };

    writer
        .flush()
        .map_err(|e| ExpandError::write(destination, e))?;
    drop(writer);

    set_mode(destination, mode)?;
    Ok(written)
}

/// Opens `path` for writing, creating it with `mode` or truncating it.
pub(crate) fn create_truncated(path: &Path, mode: u32) -> Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|e| ExpandError::write(path, e))
}

/// Applies permission bits to `path` (Unix only).
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| ExpandError::metadata(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);

    Ok(())
}

fn read_error(e: io::Error, sink: &Path) -> ExpandError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            ExpandError::Format {
                format: "archive",
                reason: format!("corrupt data for {}: {e}", sink.display()),
            }
        }
        _ => ExpandError::Io(e),
    }
}
