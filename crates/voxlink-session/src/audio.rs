use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info};
use voxlink_codec::{Decoder, PCM_SAMPLE_BYTES};

use crate::config::{AudioFormat, IngestFormat};
use crate::error::Result;

/// One upload from the device, as received and as PCM.
#[derive(Debug, Clone)]
pub struct ReceivedAudio {
    /// Payload bytes exactly as they arrived.
    pub payload: Bytes,
    pub format: IngestFormat,
    /// Decoded 16-bit samples.
    pub samples: Vec<i16>,
}

impl ReceivedAudio {
    /// Interpret a payload. ADPCM is decoded with fresh codec state; PCM
    /// drops an incomplete trailing byte.
    pub fn from_payload(payload: Bytes, format: IngestFormat) -> Self {
        let samples = match format {
            IngestFormat::Pcm => pcm_from_le_bytes(&payload),
            IngestFormat::Adpcm => {
                let mut samples = Vec::with_capacity(payload.len() * 2);
                Decoder::new().push(&payload, &mut samples);
                samples
            }
        };
        Self {
            payload,
            format,
            samples,
        }
    }

    /// True when the device captured nothing.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Playback length in the given format.
    pub fn duration_ms(&self, audio: &AudioFormat) -> u64 {
        let frames = self.samples.len() as u64 / u64::from(audio.channels.max(1));
        frames * 1000 / u64::from(audio.sample_rate.max(1))
    }

    /// Keep this upload at `path`: decoded WAV for `.wav` paths, the raw
    /// payload otherwise.
    pub fn save(&self, path: &Path, audio: &AudioFormat) -> Result<()> {
        if has_wav_extension(path) {
            write_wav(path, &self.samples, audio)?;
        } else {
            fs::write(path, &self.payload)?;
        }
        info!(
            path = %path.display(),
            bytes = self.payload.len(),
            samples = self.samples.len(),
            "received audio saved"
        );
        Ok(())
    }
}

/// Split little-endian 16-bit PCM into samples, dropping an odd final byte.
pub fn pcm_from_le_bytes(pcm: &[u8]) -> Vec<i16> {
    pcm.chunks_exact(PCM_SAMPLE_BYTES)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Join samples into little-endian 16-bit PCM.
pub fn pcm_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn wav_spec(audio: &AudioFormat) -> hound::WavSpec {
    hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write interleaved samples as a 16-bit WAV file.
pub fn write_wav(path: &Path, samples: &[i16], audio: &AudioFormat) -> Result<()> {
    fs::write(path, samples_to_wav(samples, audio)?)?;
    Ok(())
}

/// Render interleaved samples as an in-memory WAV file.
pub fn samples_to_wav(samples: &[i16], audio: &AudioFormat) -> Result<Vec<u8>> {
    audio.validate()?;
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec(audio))?;
        write_samples(&mut writer, samples)?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn write_samples<W: Write + Seek>(
    writer: &mut hound::WavWriter<W>,
    samples: &[i16],
) -> Result<()> {
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    Ok(())
}

/// Samples of the first channel of a 16-bit integer WAV, plus its format.
pub fn read_wav_mono(path: &Path) -> std::result::Result<(Vec<i16>, AudioFormat), hound::Error> {
    let reader = hound::WavReader::open(path)?;
    read_first_channel(reader)
}

fn read_first_channel<R: Read>(
    reader: hound::WavReader<R>,
) -> std::result::Result<(Vec<i16>, AudioFormat), hound::Error> {
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(hound::Error::Unsupported);
    }
    let channels = usize::from(spec.channels.max(1));
    let samples = reader
        .into_samples::<i16>()
        .step_by(channels)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(
        samples = samples.len(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        "wav loaded"
    );
    Ok((
        samples,
        AudioFormat {
            channels: 1,
            sample_rate: spec.sample_rate,
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use voxlink_codec::Encoder;

    use super::*;

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn pcm_payload_drops_odd_byte() {
        let audio = ReceivedAudio::from_payload(
            Bytes::from_static(&[0x01, 0x00, 0xFF, 0xFF, 0x7F]),
            IngestFormat::Pcm,
        );
        assert_eq!(audio.samples, vec![1, -1]);
        assert_eq!(audio.payload.len(), 5);
    }

    #[test]
    fn adpcm_payload_is_decoded() {
        let pcm: Vec<i16> = (0..64).map(|i| (i * 200) as i16).collect();
        let mut encoded = Vec::new();
        let mut encoder = Encoder::new();
        encoder.push_samples(&pcm, &mut encoded);
        encoder.finish(&mut encoded);

        let audio = ReceivedAudio::from_payload(Bytes::from(encoded), IngestFormat::Adpcm);
        assert_eq!(audio.samples.len(), 64);
        assert_eq!(audio.format, IngestFormat::Adpcm);
    }

    #[test]
    fn empty_payload() {
        let audio = ReceivedAudio::from_payload(Bytes::new(), IngestFormat::Adpcm);
        assert!(audio.is_empty());
        assert!(audio.samples.is_empty());
        assert_eq!(audio.duration_ms(&AudioFormat::default()), 0);
    }

    #[test]
    fn duration_uses_rate() {
        let audio = ReceivedAudio::from_payload(
            Bytes::from(vec![0u8; 32_000]),
            IngestFormat::Pcm,
        );
        assert_eq!(audio.duration_ms(&AudioFormat::default()), 1000);
    }

    #[test]
    fn save_wav_and_raw() {
        let dir = unique_temp_dir("voxlink-audio");
        let audio = ReceivedAudio::from_payload(
            Bytes::from(pcm_to_le_bytes(&[10, -10, 300])),
            IngestFormat::Pcm,
        );

        let wav = dir.join("upload.WAV");
        audio.save(&wav, &AudioFormat::default()).unwrap();
        let (samples, format) = read_wav_mono(&wav).unwrap();
        assert_eq!(samples, vec![10, -10, 300]);
        assert_eq!(format.sample_rate, 16_000);

        let raw = dir.join("upload.pcm");
        audio.save(&raw, &AudioFormat::default()).unwrap();
        assert_eq!(fs::read(&raw).unwrap(), audio.payload.to_vec());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn stereo_wav_reads_first_channel() {
        let stereo = AudioFormat {
            channels: 2,
            sample_rate: 24_000,
        };
        let bytes = samples_to_wav(&[1, 100, 2, 200, 3, 300], &stereo).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let (samples, format) = read_first_channel(reader).unwrap();
        assert_eq!(samples, vec![1, 2, 3]);
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_rate, 24_000);
    }

    #[test]
    fn wav_extension_is_case_insensitive() {
        assert!(has_wav_extension(Path::new("a/b.wav")));
        assert!(has_wav_extension(Path::new("B.Wav")));
        assert!(!has_wav_extension(Path::new("b.pcm")));
        assert!(!has_wav_extension(Path::new("wav")));
    }
}
