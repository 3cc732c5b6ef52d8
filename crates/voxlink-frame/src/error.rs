use std::fmt;

/// Why a fixed-size read ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortRead {
    /// The peer closed the connection.
    Closed,
    /// The read timeout elapsed.
    TimedOut,
}

impl fmt::Display for ShortRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortRead::Closed => f.write_str("connection closed"),
            ShortRead::TimedOut => f.write_str("read timed out"),
        }
    }
}

/// Errors that can occur while reading or writing link frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer than 4 length-prefix bytes arrived.
    #[error("short frame header ({received} of 4 bytes): {cause}")]
    ShortHeader { received: usize, cause: ShortRead },

    /// Fewer payload bytes arrived than the length prefix declared.
    #[error("short frame body ({received} of {expected} bytes): {cause}")]
    ShortBody {
        expected: usize,
        received: usize,
        cause: ShortRead,
    },

    /// The declared payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A hex frame contained characters that are not hex digits, or an odd
    /// number of them.
    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Framing configuration is unusable.
    #[error("invalid frame config: {0}")]
    InvalidConfig(&'static str),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was exchanged.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for ingest violations: the session ends without a response.
    pub fn is_short_read(&self) -> bool {
        matches!(
            self,
            FrameError::ShortHeader { .. } | FrameError::ShortBody { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
