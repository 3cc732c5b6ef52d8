//! Framing for the voxlink device link.
//!
//! The device speaks three framings over one connection:
//! - Ingest: a 4-byte big-endian length followed by exactly that many bytes
//! - Hex egress: uppercase ASCII hex, paced in chunks, ended by one `*`
//! - Raw egress: paced binary chunks with no terminator; the stream ends
//!   when the server half-closes the connection
//!
//! Chunk size and inter-chunk delay exist for the receiver's small buffers
//! and are always configuration ([`PacingConfig`]).

pub mod codec;
pub mod config;
pub mod error;
pub mod hex_frame;
pub mod ingest;
mod pacing;
pub mod raw;

pub use codec::{
    decode_hex_payload, encode_hex_frame, encode_ingest_frame, IngestFrame, LENGTH_PREFIX_SIZE,
    TERMINATOR,
};
pub use config::{
    IngestConfig, PacingConfig, DEFAULT_CHUNK_DELAY, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_PAYLOAD,
    DEFAULT_READ_TIMEOUT,
};
pub use error::{FrameError, Result, ShortRead};
pub use hex_frame::{HexFrameReader, HexFrameWriter};
pub use ingest::IngestReader;
pub use raw::RawAudioWriter;
