//! The device's half of a round trip, for simulators and tests.

use std::time::Duration;

use bytes::BytesMut;
use tracing::debug;
use voxlink_codec::Decoder;
use voxlink_frame::{encode_ingest_frame, HexFrameReader};
use voxlink_transport::{LinkStream, TcpLink};

use crate::control::ControlRecord;
use crate::error::Result;

/// What the device receives back for one upload.
#[derive(Debug, Clone)]
pub struct DeviceReply {
    pub control: ControlRecord,
    /// Raw ADPCM reply audio.
    pub audio: Vec<u8>,
}

impl DeviceReply {
    /// Decode the reply audio with fresh codec state.
    pub fn decode_audio(&self) -> Vec<i16> {
        let mut samples = Vec::with_capacity(self.audio.len() * 2);
        Decoder::new().push(&self.audio, &mut samples);
        samples
    }
}

/// Upload `payload` and collect the reply until the server closes its
/// write side.
pub fn exchange(mut stream: LinkStream, payload: &[u8]) -> Result<DeviceReply> {
    let mut frame = BytesMut::new();
    encode_ingest_frame(payload, &mut frame)?;
    std::io::Write::write_all(&mut stream, &frame)?;
    debug!(bytes = payload.len(), "upload sent");

    let mut reader = HexFrameReader::new(stream);
    let json = reader.read_frame()?;
    let control = ControlRecord::from_json(&json)?;

    let mut audio = Vec::new();
    reader.read_raw_to_end(&mut audio)?;
    debug!(audio_bytes = audio.len(), "reply received");

    Ok(DeviceReply { control, audio })
}

/// Connect to `addr` and run [`exchange`], bounding every read by
/// `read_timeout`.
pub fn connect_and_exchange(
    addr: &str,
    payload: &[u8],
    read_timeout: Option<Duration>,
) -> Result<DeviceReply> {
    let stream = match read_timeout {
        Some(timeout) => TcpLink::connect_timeout(addr, timeout)?,
        None => TcpLink::connect(addr)?,
    };
    stream.set_read_timeout(read_timeout)?;
    exchange(stream, payload)
}
