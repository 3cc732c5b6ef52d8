use std::io::{ErrorKind, Write};

use crate::config::PacingConfig;
use crate::error::{FrameError, Result};

/// Write all of `data`, retrying interrupted writes. Link streams are
/// blocking, so a would-block result is a timeout and fails the write.
pub(crate) fn write_all_retrying<T: Write>(inner: &mut T, data: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < data.len() {
        match inner.write(&data[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Flush, retrying interrupted flushes.
pub(crate) fn flush_retrying<T: Write>(inner: &mut T) -> Result<()> {
    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Write `data` in `chunk_size` pieces, flushing and sleeping after each.
///
/// Returns the number of chunks written.
pub(crate) fn write_paced<T: Write>(
    inner: &mut T,
    data: &[u8],
    pacing: &PacingConfig,
) -> Result<usize> {
    pacing.validate()?;

    let mut chunks = 0usize;
    for chunk in data.chunks(pacing.chunk_size) {
        write_all_retrying(inner, chunk)?;
        flush_retrying(inner)?;
        chunks += 1;
        if !pacing.chunk_delay.is_zero() {
            std::thread::sleep(pacing.chunk_delay);
        }
    }
    Ok(chunks)
}
