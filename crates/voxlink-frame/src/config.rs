use std::time::Duration;

use crate::error::{FrameError, Result};

/// Default maximum ingest payload: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Default ingest read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default egress chunk size in wire bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default delay after each egress chunk.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(5);

/// Configuration for the ingest reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Largest accepted declared length. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout while the header and body arrive. Default: 60 s.
    pub read_timeout: Option<Duration>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// Chunking and pacing for egress, sized for the device's receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// Maximum wire bytes per write. Default: 1024.
    pub chunk_size: usize,
    /// Pause after every chunk. Default: 5 ms.
    pub chunk_delay: Duration,
}

impl PacingConfig {
    /// Pacing with no delay, for tests and fast receivers.
    pub fn unpaced(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_delay: Duration::ZERO,
        }
    }

    /// Reject settings that cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FrameError::InvalidConfig("chunk size must be at least 1 byte"));
        }
        Ok(())
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }
}
