use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::debug;
use voxlink_transport::LinkStream;

use crate::codec::{IngestFrame, LENGTH_PREFIX_SIZE};
use crate::config::IngestConfig;
use crate::error::{FrameError, Result, ShortRead};

const READ_CHUNK_SIZE: usize = 8 * 1024;
const INITIAL_BODY_CAPACITY: usize = 64 * 1024;

/// Reads length-prefixed upload frames from any `Read` stream.
///
/// The prefix is authoritative: the reader accumulates until exactly the
/// declared number of bytes has arrived, however the stream splits them.
pub struct IngestReader<T> {
    inner: T,
    config: IngestConfig,
}

/// Outcome of filling a fixed-size buffer.
enum Fill {
    Complete,
    Short { received: usize, cause: ShortRead },
}

impl<T: Read> IngestReader<T> {
    /// Create a new ingest reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, IngestConfig::default())
    }

    /// Create a new ingest reader with explicit configuration.
    ///
    /// The read timeout in `config` only takes effect on streams that
    /// support it; see [`IngestReader::with_config_link`].
    pub fn with_config(inner: T, config: IngestConfig) -> Self {
        Self { inner, config }
    }

    /// Read one complete frame (blocking).
    ///
    /// A zero length yields an empty payload. EOF or a timeout before the
    /// header completes is [`FrameError::ShortHeader`]; before the body
    /// completes, [`FrameError::ShortBody`].
    pub fn read_frame(&mut self) -> Result<IngestFrame> {
        let mut header = [0u8; LENGTH_PREFIX_SIZE];
        if let Fill::Short { received, cause } = fill(&mut self.inner, &mut header)? {
            return Err(FrameError::ShortHeader { received, cause });
        }

        let length = u32::from_be_bytes(header);
        let expected = length as usize;
        if expected > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: expected,
                max: self.config.max_payload_size,
            });
        }
        debug!(length, "ingest header received");

        let mut body = BytesMut::with_capacity(expected.min(INITIAL_BODY_CAPACITY));
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while body.len() < expected {
            let want = (expected - body.len()).min(READ_CHUNK_SIZE);
            match fill(&mut self.inner, &mut chunk[..want])? {
                Fill::Complete => body.extend_from_slice(&chunk[..want]),
                Fill::Short { received, cause } => {
                    return Err(FrameError::ShortBody {
                        expected,
                        received: body.len() + received,
                        cause,
                    });
                }
            }
        }

        Ok(IngestFrame {
            length,
            payload: body.freeze(),
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current ingest configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }
}

impl IngestReader<LinkStream> {
    /// Create an ingest reader for a link and apply the read timeout.
    pub fn with_config_link(inner: LinkStream, config: IngestConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

/// Fill `buf` completely, stopping early on EOF or timeout.
fn fill<T: Read>(inner: &mut T, buf: &mut [u8]) -> Result<Fill> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(Fill::Short {
                    received: filled,
                    cause: ShortRead::Closed,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            // Socket read timeouts surface as WouldBlock on Unix and TimedOut on Windows.
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(Fill::Short {
                    received: filled,
                    cause: ShortRead::TimedOut,
                })
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                return Ok(Fill::Short {
                    received: filled,
                    cause: ShortRead::Closed,
                })
            }
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(Fill::Complete)
}

pub(crate) fn transport_to_frame_error(err: voxlink_transport::TransportError) -> FrameError {
    match err {
        voxlink_transport::TransportError::Io(io)
        | voxlink_transport::TransportError::Accept(io) => FrameError::Io(io),
        voxlink_transport::TransportError::Bind { source, .. }
        | voxlink_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
