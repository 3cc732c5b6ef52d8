use tracing::trace;

use crate::adpcm::{decode_sample, encode_pair};
use crate::state::CodecState;

/// Encodes one continuous PCM stream delivered in arbitrary chunks.
///
/// Chunk boundaries never change the output: a dangling PCM byte or an
/// unpaired sample is held until the next chunk, and [`Encoder::finish`]
/// zero-pads a final unpaired sample.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    state: CodecState,
    pending_byte: Option<u8>,
    pending_sample: Option<i16>,
}

impl Encoder {
    /// Start a stream from the zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stream from an explicit state.
    pub fn with_state(state: CodecState) -> Self {
        Self {
            state,
            pending_byte: None,
            pending_sample: None,
        }
    }

    /// Current codec state.
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// Encode samples, appending complete bytes to `out`.
    pub fn push_samples(&mut self, pcm: &[i16], out: &mut Vec<u8>) {
        let mut rest = pcm;
        if let Some(first) = self.pending_sample.take() {
            match rest.split_first() {
                Some((&second, tail)) => {
                    out.push(encode_pair(&mut self.state, first, second));
                    rest = tail;
                }
                None => {
                    self.pending_sample = Some(first);
                    return;
                }
            }
        }

        out.reserve(rest.len() / 2);
        let mut pairs = rest.chunks_exact(2);
        for pair in &mut pairs {
            out.push(encode_pair(&mut self.state, pair[0], pair[1]));
        }
        self.pending_sample = pairs.remainder().first().copied();
    }

    /// Encode little-endian PCM bytes, appending complete bytes to `out`.
    pub fn push_bytes(&mut self, pcm: &[u8], out: &mut Vec<u8>) {
        let mut bytes = pcm;
        let mut samples = Vec::with_capacity(pcm.len() / 2 + 1);

        if let Some(lo) = self.pending_byte.take() {
            match bytes.split_first() {
                Some((&hi, rest)) => {
                    samples.push(i16::from_le_bytes([lo, hi]));
                    bytes = rest;
                }
                None => {
                    self.pending_byte = Some(lo);
                    return;
                }
            }
        }

        let mut chunks = bytes.chunks_exact(2);
        samples.extend(chunks.by_ref().map(|b| i16::from_le_bytes([b[0], b[1]])));
        self.pending_byte = chunks.remainder().first().copied();

        self.push_samples(&samples, out);
    }

    /// End the stream: flush an unpaired sample with a zero pad and drop a
    /// dangling half sample. Returns the final state.
    pub fn finish(mut self, out: &mut Vec<u8>) -> CodecState {
        if self.pending_byte.take().is_some() {
            trace!("dropping incomplete trailing pcm byte");
        }
        if let Some(first) = self.pending_sample.take() {
            trace!("zero-padding unpaired trailing sample");
            out.push(encode_pair(&mut self.state, first, 0));
        }
        self.state
    }
}

/// Decodes one continuous ADPCM stream delivered in arbitrary chunks.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: CodecState,
}

impl Decoder {
    /// Start a stream from the zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stream from an explicit state.
    pub fn with_state(state: CodecState) -> Self {
        Self { state }
    }

    /// Current codec state.
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// Decode bytes, appending two samples per byte to `out`.
    pub fn push(&mut self, adpcm: &[u8], out: &mut Vec<i16>) {
        out.reserve(adpcm.len() * 2);
        for &byte in adpcm {
            out.push(decode_sample(&mut self.state, byte & 0x0F));
            out.push(decode_sample(&mut self.state, byte >> 4));
        }
    }

    /// Decode bytes into little-endian PCM bytes.
    pub fn push_to_pcm_bytes(&mut self, adpcm: &[u8], out: &mut Vec<u8>) {
        out.reserve(adpcm.len() * 4);
        for &byte in adpcm {
            out.extend_from_slice(&decode_sample(&mut self.state, byte & 0x0F).to_le_bytes());
            out.extend_from_slice(&decode_sample(&mut self.state, byte >> 4).to_le_bytes());
        }
    }
}
