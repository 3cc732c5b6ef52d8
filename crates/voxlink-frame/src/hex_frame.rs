use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BytesMut};
use tracing::debug;
use voxlink_transport::LinkStream;

use crate::codec::{decode_hex_payload, TERMINATOR};
use crate::config::{PacingConfig, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::ingest::transport_to_frame_error;
use crate::pacing::{flush_retrying, write_all_retrying, write_paced};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Writes hex-encoded, `*`-terminated frames for the control channel.
///
/// The payload is rendered as uppercase hex (two characters per byte),
/// written in paced chunks, then followed by a single terminator. No length
/// is sent; the device scans for the terminator.
pub struct HexFrameWriter<T> {
    inner: T,
    pacing: PacingConfig,
}

impl<T: Write> HexFrameWriter<T> {
    /// Create a new hex writer with default pacing.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, PacingConfig::default())
    }

    /// Create a new hex writer with explicit pacing.
    pub fn with_config(inner: T, pacing: PacingConfig) -> Self {
        Self { inner, pacing }
    }

    /// Encode and send one frame. Returns the wire bytes written, including
    /// the terminator.
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.pacing.validate()?;

        let text = hex::encode_upper(payload);
        let chunks = write_paced(&mut self.inner, text.as_bytes(), &self.pacing)?;
        write_all_retrying(&mut self.inner, &[TERMINATOR])?;
        flush_retrying(&mut self.inner)?;

        debug!(
            payload_bytes = payload.len(),
            hex_chars = text.len(),
            chunks,
            "hex frame sent"
        );
        Ok(text.len() + 1)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current pacing configuration.
    pub fn config(&self) -> &PacingConfig {
        &self.pacing
    }
}

impl HexFrameWriter<LinkStream> {
    /// Create a hex writer for a link with Nagle batching disabled. Egress
    /// writes block without a timeout.
    pub fn with_config_link(inner: LinkStream, pacing: PacingConfig) -> Result<Self> {
        inner.set_nodelay(true).map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, pacing))
    }
}

/// Reads hex frames the way the device does: accumulate until `*`, skip
/// line breaks, decode. Bytes after the terminator are kept for the raw
/// stream that follows.
pub struct HexFrameReader<T> {
    inner: T,
    buf: BytesMut,
    max_hex_len: usize,
}

impl<T: Read> HexFrameReader<T> {
    /// Create a reader accepting frames up to the default payload size.
    pub fn new(inner: T) -> Self {
        Self::with_max_payload(inner, DEFAULT_MAX_PAYLOAD)
    }

    /// Create a reader accepting decoded payloads up to `max_payload` bytes.
    pub fn with_max_payload(inner: T, max_payload: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            max_hex_len: max_payload.saturating_mul(2),
        }
    }

    /// Read and decode the next hex frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` on EOF before `*`.
    pub fn read_frame(&mut self) -> Result<Vec<u8>> {
        let mut scanned = 0usize;
        loop {
            if let Some(pos) = self.buf[scanned..].iter().position(|b| *b == TERMINATOR) {
                let end = scanned + pos;
                let payload = decode_hex_payload(&self.buf[..end])?;
                self.buf.advance(end + 1);
                return Ok(payload);
            }
            scanned = self.buf.len();

            if scanned > self.max_hex_len {
                return Err(FrameError::PayloadTooLarge {
                    size: scanned / 2,
                    max: self.max_hex_len / 2,
                });
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }
            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read everything after the last frame until the peer closes the
    /// stream. Returns the number of bytes appended to `out`.
    pub fn read_raw_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let buffered = self.buf.len();
        out.extend_from_slice(&self.buf);
        self.buf.clear();

        loop {
            match self.inner.read_to_end(out) {
                Ok(n) => return Ok(buffered + n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader, returning the stream and any buffered bytes that
    /// followed the last terminator.
    pub fn into_parts(self) -> (T, BytesMut) {
        (self.inner, self.buf)
    }
}
