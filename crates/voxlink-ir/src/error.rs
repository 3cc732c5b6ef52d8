use crate::frame::{FRAME_LEN, HEADER};

/// Errors from parsing an IR frame back from text.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// The text is not valid hex.
    #[error("invalid IR hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The frame is not exactly six bytes.
    #[error("IR frame must be {FRAME_LEN} bytes, got {0}")]
    Length(usize),

    /// The first byte is not the protocol header.
    #[error("IR frame header must be {HEADER:#04X}, got {0:#04X}")]
    Header(u8),

    /// A check byte is not the complement of the byte before it.
    #[error("IR check byte {index} is {found:#04X}, expected {expected:#04X}")]
    Complement {
        index: usize,
        found: u8,
        expected: u8,
    },
}

pub type Result<T> = std::result::Result<T, IrError>;
