use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::read_wav_mono;
use crate::error::CollaboratorError;

/// Turns reply text into 16-bit PCM samples for the device speaker.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<i16>, CollaboratorError>;
}

/// Produces no audio. The device still gets the control frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn synthesize(&self, _text: &str) -> Result<Vec<i16>, CollaboratorError> {
        Ok(Vec::new())
    }
}

/// Plays the same WAV file for every reply.
///
/// The file is read on every call so it can be replaced while serving. Only
/// the first channel of a 16-bit integer WAV is used.
#[derive(Debug, Clone)]
pub struct WavSynthesizer {
    path: PathBuf,
}

impl WavSynthesizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpeechSynthesizer for WavSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<i16>, CollaboratorError> {
        let (samples, format) = read_wav_mono(&self.path)?;
        debug!(
            chars = text.chars().count(),
            samples = samples.len(),
            sample_rate = format.sample_rate,
            "canned speech"
        );
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::write_wav;
    use crate::config::AudioFormat;

    #[test]
    fn silent_is_empty() {
        assert!(SilentSynthesizer.synthesize("hello").unwrap().is_empty());
    }

    #[test]
    fn wav_synthesizer_reads_file() {
        let path = std::env::temp_dir().join(format!("voxlink-speech-{}.wav", std::process::id()));
        write_wav(&path, &[5, 6, 7, 8], &AudioFormat::default()).unwrap();

        let synth = WavSynthesizer::new(&path);
        assert_eq!(synth.synthesize("anything").unwrap(), vec![5, 6, 7, 8]);
        assert_eq!(synth.path(), path.as_path());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn wav_synthesizer_missing_file_fails() {
        let synth = WavSynthesizer::new("/nonexistent/voxlink/reply.wav");
        assert!(matches!(
            synth.synthesize("x"),
            Err(CollaboratorError::Wav(_))
        ));
    }
}
