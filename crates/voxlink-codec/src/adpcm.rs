use crate::state::CodecState;

/// Bytes of PCM per 16-bit sample.
pub const PCM_SAMPLE_BYTES: usize = 2;

/// Encode one sample into a 4-bit code and advance `state`.
///
/// The magnitude is quantized bit-serially against `step`, `step/2` and
/// `step/4`. After the call, `state.predictor()` holds the sample a decoder
/// will reconstruct from the returned code.
#[inline]
pub fn encode_sample(state: &mut CodecState, sample: i16) -> u8 {
    let step = state.step();
    let mut diff = i32::from(sample) - i32::from(state.predictor());
    let sign = if diff < 0 { 8u8 } else { 0u8 };
    if sign != 0 {
        diff = -diff;
    }

    let mut code = 0u8;
    let mut diffq = step >> 3;
    if diff >= step {
        code |= 4;
        diff -= step;
        diffq += step;
    }
    if diff >= step >> 1 {
        code |= 2;
        diff -= step >> 1;
        diffq += step >> 1;
    }
    if diff >= step >> 2 {
        code |= 1;
        diffq += step >> 2;
    }

    let code = code | sign;
    state.advance(code, diffq);
    code
}

/// Decode one 4-bit code (upper bits ignored) and advance `state`.
#[inline]
pub fn decode_sample(state: &mut CodecState, code: u8) -> i16 {
    let step = state.step();
    let mut diffq = step >> 3;
    if code & 4 != 0 {
        diffq += step;
    }
    if code & 2 != 0 {
        diffq += step >> 1;
    }
    if code & 1 != 0 {
        diffq += step >> 2;
    }

    state.advance(code, diffq);
    state.predictor()
}

/// Encode two samples into one byte: first in the low nibble.
#[inline]
pub fn encode_pair(state: &mut CodecState, first: i16, second: i16) -> u8 {
    let lo = encode_sample(state, first);
    let hi = encode_sample(state, second);
    (hi << 4) | lo
}

/// Number of ADPCM bytes produced for `samples` PCM samples.
///
/// An unpaired final sample still takes a whole byte.
pub fn encoded_len(samples: usize) -> usize {
    samples.div_ceil(2)
}

/// Number of PCM samples produced by decoding `bytes` ADPCM bytes.
pub fn decoded_len(bytes: usize) -> usize {
    bytes.saturating_mul(2)
}

/// Encode `pcm` into `out`, returning the number of bytes written.
///
/// An odd final sample is paired with a zero pad sample, which is encoded
/// like any other and advances the state. Encoding stops early (without
/// panicking) when `out` is too small.
pub fn encode_into(state: &mut CodecState, pcm: &[i16], out: &mut [u8]) -> usize {
    let mut written = 0usize;
    for (pair, slot) in pcm.chunks(2).zip(out.iter_mut()) {
        let second = pair.get(1).copied().unwrap_or(0);
        *slot = encode_pair(state, pair[0], second);
        written += 1;
    }
    written
}

/// Decode `adpcm` into `out`, returning the number of samples written.
///
/// Each byte yields two samples, low nibble first. Decoding stops at the
/// last byte whose two samples fit in `out`.
pub fn decode_into(state: &mut CodecState, adpcm: &[u8], out: &mut [i16]) -> usize {
    let mut written = 0usize;
    for (&byte, slot) in adpcm.iter().zip(out.chunks_exact_mut(2)) {
        slot[0] = decode_sample(state, byte & 0x0F);
        slot[1] = decode_sample(state, byte >> 4);
        written += 2;
    }
    written
}

/// Encode little-endian 16-bit PCM bytes.
///
/// A trailing odd byte is an incomplete sample and is dropped.
pub fn encode_pcm_bytes(state: &mut CodecState, pcm: &[u8]) -> Vec<u8> {
    let samples: Vec<i16> = pcm
        .chunks_exact(PCM_SAMPLE_BYTES)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    let mut out = vec![0u8; encoded_len(samples.len())];
    let written = encode_into(state, &samples, &mut out);
    out.truncate(written);
    out
}

/// Decode ADPCM bytes into little-endian 16-bit PCM bytes.
pub fn decode_to_pcm_bytes(state: &mut CodecState, adpcm: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(decoded_len(adpcm.len()) * PCM_SAMPLE_BYTES);
    for &byte in adpcm {
        out.extend_from_slice(&decode_sample(state, byte & 0x0F).to_le_bytes());
        out.extend_from_slice(&decode_sample(state, byte >> 4).to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tables::MAX_STEP_INDEX;

    #[test]
    fn known_pair_vector() {
        let mut enc = CodecState::default();
        let byte = encode_pair(&mut enc, 100, -100);
        assert_eq!(byte, 0xF7);
        assert_eq!((enc.predictor(), enc.step_index()), (-19, 16));

        let mut dec = CodecState::default();
        let mut out = [0i16; 2];
        assert_eq!(decode_into(&mut dec, &[byte], &mut out), 2);
        assert_eq!(out, [11, -19]);
        assert_eq!(dec, enc);
    }

    #[test]
    fn silence_encodes_to_zero_codes() {
        let mut state = CodecState::default();
        let mut out = [0xAAu8; 4];
        let n = encode_into(&mut state, &[0; 8], &mut out);
        assert_eq!(n, 4);
        assert_eq!(out, [0; 4]);
        assert_eq!(state, CodecState::default());
    }

    #[test]
    fn odd_sample_is_zero_padded_into_high_nibble() {
        let mut padded = CodecState::default();
        let mut out = [0u8; 2];
        let n = encode_into(&mut padded, &[100, -100, 100], &mut out);
        assert_eq!(n, 2);

        let mut explicit = CodecState::default();
        let mut expected = [0u8; 2];
        encode_into(&mut explicit, &[100, -100, 100, 0], &mut expected);
        assert_eq!(out, expected);
        assert_eq!(padded, explicit);
    }

    #[test]
    fn encode_stops_when_output_is_short() {
        let mut state = CodecState::default();
        let mut out = [0u8; 1];
        assert_eq!(encode_into(&mut state, &[1, 2, 3, 4], &mut out), 1);
    }

    #[test]
    fn decode_stops_when_output_is_short() {
        let mut state = CodecState::default();
        let mut out = [0i16; 3];
        assert_eq!(decode_into(&mut state, &[0x77, 0x77], &mut out), 2);
    }

    #[test]
    fn pcm_bytes_drop_trailing_odd_byte() {
        let mut a = CodecState::default();
        let mut b = CodecState::default();
        let with_tail = encode_pcm_bytes(&mut a, &[0x64, 0x00, 0x9C, 0xFF, 0x7F]);
        let without = encode_pcm_bytes(&mut b, &[0x64, 0x00, 0x9C, 0xFF]);
        assert_eq!(with_tail, without);
        assert_eq!(with_tail, vec![0xF7]);
    }

    #[test]
    fn pcm_bytes_decode_low_nibble_first() {
        let mut state = CodecState::default();
        let pcm = decode_to_pcm_bytes(&mut state, &[0xF7]);
        assert_eq!(pcm, [11i16.to_le_bytes(), (-19i16).to_le_bytes()].concat());
    }

    #[test]
    fn lengths() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(3), 2);
        assert_eq!(encoded_len(4), 2);
        assert_eq!(decoded_len(5), 10);
    }

    fn arb_state() -> impl Strategy<Value = CodecState> {
        (any::<i16>(), 0u8..=MAX_STEP_INDEX).prop_map(|(p, i)| CodecState::new(p, i))
    }

    proptest! {
        #[test]
        fn decoder_tracks_encoder_reconstruction(
            initial in arb_state(),
            pcm in prop::collection::vec(any::<i16>(), 0..512),
        ) {
            let mut enc = initial;
            let mut reconstructed = Vec::with_capacity(pcm.len() + 1);
            let mut packed = Vec::with_capacity(encoded_len(pcm.len()));
            for pair in pcm.chunks(2) {
                let lo = encode_sample(&mut enc, pair[0]);
                reconstructed.push(enc.predictor());
                let hi = encode_sample(&mut enc, pair.get(1).copied().unwrap_or(0));
                reconstructed.push(enc.predictor());
                packed.push((hi << 4) | lo);
            }

            let mut dec = initial;
            let mut decoded = vec![0i16; decoded_len(packed.len())];
            let n = decode_into(&mut dec, &packed, &mut decoded);

            prop_assert_eq!(n, reconstructed.len());
            prop_assert_eq!(decoded, reconstructed);
            prop_assert_eq!(dec, enc);
        }

        #[test]
        fn state_stays_in_range_for_any_codes(
            initial in arb_state(),
            codes in prop::collection::vec(0u8..16, 0..1024),
        ) {
            let mut state = initial;
            for code in codes {
                decode_sample(&mut state, code);
                prop_assert!(state.step_index() <= MAX_STEP_INDEX);
                prop_assert!(state.step() >= 7 && state.step() <= i32::from(i16::MAX));
            }
        }

        #[test]
        fn buffer_encoder_matches_sample_encoder(
            initial in arb_state(),
            pcm in prop::collection::vec(any::<i16>(), 0..256),
        ) {
            let mut a = initial;
            let mut out = vec![0u8; encoded_len(pcm.len())];
            let n = encode_into(&mut a, &pcm, &mut out);
            prop_assert_eq!(n, out.len());

            let mut b = initial;
            let expected: Vec<u8> = pcm
                .chunks(2)
                .map(|p| encode_pair(&mut b, p[0], p.get(1).copied().unwrap_or(0)))
                .collect();
            prop_assert_eq!(out, expected);
            prop_assert_eq!(a, b);
        }
    }
}
