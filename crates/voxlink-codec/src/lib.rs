//! IMA-ADPCM compander for the voxlink device link.
//!
//! Every 16-bit sample is reduced to a 4-bit code relative to a running
//! predictor and an adaptive step size:
//! - Two codes are packed per byte, first sample in the low nibble
//! - One [`CodecState`] per stream direction, never shared
//! - No allocation and no panics in the per-sample path
//!
//! The free functions in [`adpcm`] operate on caller-provided buffers; the
//! [`Encoder`] and [`Decoder`] wrappers own a state for the lifetime of one
//! stream and accept chunks of any length.

pub mod adpcm;
pub mod state;
pub mod stream;
pub mod tables;

pub use adpcm::{
    decode_into, decode_sample, decode_to_pcm_bytes, decoded_len, encode_into, encode_pair,
    encode_pcm_bytes, encode_sample, encoded_len, PCM_SAMPLE_BYTES,
};
pub use state::CodecState;
pub use stream::{Decoder, Encoder};
pub use tables::{INDEX_TABLE, MAX_STEP_INDEX, STEP_TABLE};
