use std::io::Write;

use tracing::debug;
use voxlink_transport::LinkStream;

use crate::config::PacingConfig;
use crate::error::Result;
use crate::ingest::transport_to_frame_error;
use crate::pacing::{flush_retrying, write_paced};

/// Streams raw reply audio after the hex frame.
///
/// Bytes go out unmodified with no length and no terminator. The end of the
/// audio is signalled only by closing the write side, see
/// [`RawAudioWriter::finish_link`].
pub struct RawAudioWriter<T> {
    inner: T,
    pacing: PacingConfig,
    bytes_sent: u64,
    chunks_sent: usize,
}

impl<T: Write> RawAudioWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, PacingConfig::default())
    }

    pub fn with_config(inner: T, pacing: PacingConfig) -> Self {
        Self {
            inner,
            pacing,
            bytes_sent: 0,
            chunks_sent: 0,
        }
    }

    /// Send the next piece of audio. Pieces of any size may be passed; each
    /// is split so no write exceeds the configured chunk size.
    pub fn send(&mut self, audio: &[u8]) -> Result<()> {
        let chunks = write_paced(&mut self.inner, audio, &self.pacing)?;
        self.bytes_sent += audio.len() as u64;
        self.chunks_sent += chunks;
        Ok(())
    }

    /// Total audio bytes written so far.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Flush and hand back the stream.
    pub fn finish(mut self) -> Result<T> {
        flush_retrying(&mut self.inner)?;
        debug!(
            bytes = self.bytes_sent,
            chunks = self.chunks_sent,
            "raw audio complete"
        );
        Ok(self.inner)
    }
}

impl RawAudioWriter<LinkStream> {
    /// Create a raw writer for a link with Nagle batching disabled.
    pub fn with_config_link(inner: LinkStream, pacing: PacingConfig) -> Result<Self> {
        inner.set_nodelay(true).map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, pacing))
    }

    /// Flush and half-close the link so the device sees end of audio.
    pub fn finish_link(self) -> Result<LinkStream> {
        let stream = self.finish()?;
        stream.shutdown_write().map_err(transport_to_frame_error)?;
        Ok(stream)
    }
}
