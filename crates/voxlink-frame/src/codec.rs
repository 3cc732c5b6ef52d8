use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Ingest length prefix: 4 bytes, big-endian.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Sentinel ending a hex egress frame (`*`).
pub const TERMINATOR: u8 = b'*';

/// A complete ingest frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFrame {
    /// Length declared by the prefix.
    pub length: u32,
    /// Exactly `length` payload bytes.
    pub payload: Bytes,
}

impl IngestFrame {
    /// Create a frame; the length is taken from the payload.
    ///
    /// Payloads longer than `u32::MAX` cannot be framed; use
    /// [`encode_ingest_frame`] to get an error instead of truncation.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            length: u32::try_from(payload.len()).unwrap_or(u32::MAX),
            payload,
        }
    }

    /// True when the device captured no audio (`length == 0`).
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The total wire size of this frame (prefix + payload).
    pub fn wire_size(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.payload.len()
    }
}

/// Encode an ingest frame (the device's upload format).
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────────┐
/// │ Length (4B BE)   │ Payload (Length B)   │
/// └──────────────────┴──────────────────────┘
/// ```
pub fn encode_ingest_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;
    dst.reserve(LENGTH_PREFIX_SIZE + payload.len());
    dst.put_u32(length);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a hex egress frame without pacing.
///
/// Wire format:
/// ```text
/// ┌───────────────────────────────────┬──────┐
/// │ Uppercase hex, 2 chars per byte   │ '*'  │
/// └───────────────────────────────────┴──────┘
/// ```
pub fn encode_hex_frame(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(payload.len() * 2 + 1);
    dst.put_slice(hex::encode_upper(payload).as_bytes());
    dst.put_u8(TERMINATOR);
}

/// Decode the hex text of an egress frame (terminator excluded).
///
/// Line breaks are ignored and either letter case is accepted, like the
/// device parser.
pub fn decode_hex_payload(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| *b != b'\r' && *b != b'\n')
        .collect();
    Ok(hex::decode(digits)?)
}
