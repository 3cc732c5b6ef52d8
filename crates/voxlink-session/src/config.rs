use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use voxlink_frame::{IngestConfig, PacingConfig};

use crate::error::{Result, SessionError};

/// Default pause between finishing processing and the first egress byte,
/// giving the device time to switch from sending to receiving.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_secs(1);

/// Default sample rate of device audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// How the device encodes uploaded audio. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestFormat {
    /// Raw signed 16-bit little-endian PCM.
    #[default]
    Pcm,
    /// IMA-ADPCM, two samples per byte.
    Adpcm,
}

impl IngestFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestFormat::Pcm => "pcm",
            IngestFormat::Adpcm => "adpcm",
        }
    }
}

impl fmt::Display for IngestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestFormat {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pcm" => Ok(IngestFormat::Pcm),
            "adpcm" => Ok(IngestFormat::Adpcm),
            other => Err(SessionError::InvalidConfig(format!(
                "unknown ingest format {other:?} (expected pcm or adpcm)"
            ))),
        }
    }
}

/// Shape of 16-bit PCM audio written to WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioFormat {
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(SessionError::InvalidConfig(
                "audio channel count must be at least 1".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(SessionError::InvalidConfig(
                "audio sample rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Everything one session needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub ingest: IngestConfig,
    pub pacing: PacingConfig,
    pub ingest_format: IngestFormat,
    /// Where to keep the most recent upload. A `.wav` path gets decoded
    /// PCM in a WAV container; any other path gets the payload as received.
    pub save_path: Option<PathBuf>,
    pub audio: AudioFormat,
    pub reply_delay: Duration,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        self.pacing.validate()?;
        self.audio.validate()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            pacing: PacingConfig::default(),
            ingest_format: IngestFormat::default(),
            save_path: None,
            audio: AudioFormat::default(),
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }
}
