use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use voxlink_session::IngestFormat;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod adpcm;
pub mod ir;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve device round trips until interrupted.
    Serve(ServeArgs),
    /// Act as the device: upload audio and print the reply.
    Send(SendArgs),
    /// Encode one climate command as an IR frame.
    Ir(IrArgs),
    /// Convert audio between PCM and IMA-ADPCM.
    #[command(subcommand)]
    Adpcm(AdpcmCommand),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Ir(args) => ir::run(args, format),
        Command::Adpcm(command) => adpcm::run(command, format),
        Command::Version(args) => version::run(args),
    }
}

/// Upload encoding, fixed per deployment.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum IngestFormatArg {
    Pcm,
    Adpcm,
}

impl From<IngestFormatArg> for IngestFormat {
    fn from(arg: IngestFormatArg) -> Self {
        match arg {
            IngestFormatArg::Pcm => IngestFormat::Pcm,
            IngestFormatArg::Adpcm => IngestFormat::Adpcm,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "VOXLINK_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,
    /// Encoding of uploaded audio.
    #[arg(long, env = "VOXLINK_INGEST_FORMAT", value_enum, default_value = "pcm")]
    pub ingest_format: IngestFormatArg,
    /// Largest accepted upload in bytes.
    #[arg(long, env = "VOXLINK_MAX_PAYLOAD", default_value_t = voxlink_frame::DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
    /// Read timeout while an upload arrives (e.g. 60s, 500ms).
    #[arg(long, env = "VOXLINK_READ_TIMEOUT", default_value = "60s")]
    pub read_timeout: String,
    /// Largest single write to the device, in bytes.
    #[arg(long, env = "VOXLINK_CHUNK_SIZE", default_value_t = voxlink_frame::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Pause after each write to the device (e.g. 5ms, 0ms).
    #[arg(long, env = "VOXLINK_CHUNK_DELAY", default_value = "5ms")]
    pub chunk_delay: String,
    /// Pause before replying (e.g. 1s, 0ms).
    #[arg(long, env = "VOXLINK_REPLY_DELAY", default_value = "1s")]
    pub reply_delay: String,
    /// Keep the latest upload here; a .wav path stores decoded audio.
    #[arg(long, env = "VOXLINK_SAVE_AUDIO", value_name = "PATH")]
    pub save_audio: Option<PathBuf>,
    /// Channel count written to saved WAV files.
    #[arg(long, env = "VOXLINK_WAV_CHANNELS", default_value_t = 1)]
    pub wav_channels: u16,
    /// Sample rate of device audio in Hz.
    #[arg(long, env = "VOXLINK_SAMPLE_RATE", default_value_t = voxlink_session::config::DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
    /// Answer every upload with the classifier output in this file.
    #[arg(long, env = "VOXLINK_INTENT_FILE", value_name = "PATH", conflicts_with = "reply")]
    pub intent_file: Option<PathBuf>,
    /// Answer every upload with this text and no command.
    #[arg(long, conflicts_with = "intent_file")]
    pub reply: Option<String>,
    /// Play this WAV file as every spoken reply. Default: no audio.
    #[arg(long, env = "VOXLINK_SPEECH_WAV", value_name = "PATH")]
    pub speech_wav: Option<PathBuf>,
    /// Exit after serving N sessions.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Server address.
    #[arg(default_value = "127.0.0.1:8080")]
    pub addr: String,
    /// Audio to upload: a WAV file, or raw 16-bit little-endian PCM.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Compress the upload to IMA-ADPCM first.
    #[arg(long)]
    pub adpcm: bool,
    /// Read timeout for the reply (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
    /// Write the reply audio here; a .wav path stores decoded audio.
    #[arg(long, value_name = "PATH")]
    pub save_reply: Option<PathBuf>,
    /// Sample rate for a saved reply WAV, in Hz.
    #[arg(long, default_value_t = voxlink_session::config::DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

#[derive(Args, Debug)]
pub struct IrArgs {
    /// Command value: a temperature, fan speed or mode word.
    pub value: Option<String>,
    /// Device the command is for.
    #[arg(long, default_value = "空调")]
    pub target: String,
    /// Action token.
    #[arg(long, default_value = "调节")]
    pub action: String,
    /// Classifier command JSON instead of the separate fields.
    #[arg(long, conflicts_with_all = ["value", "decode"])]
    pub json: Option<String>,
    /// Parse and check an existing 12-character IR code.
    #[arg(long, value_name = "HEX", conflicts_with_all = ["value", "json"])]
    pub decode: Option<String>,
    /// Include the mark/space pulse train.
    #[arg(long)]
    pub pulses: bool,
}

#[derive(Subcommand, Debug)]
pub enum AdpcmCommand {
    /// PCM (WAV or raw s16le) to IMA-ADPCM.
    Encode(AdpcmArgs),
    /// IMA-ADPCM to PCM (WAV or raw s16le).
    Decode(AdpcmArgs),
}

#[derive(Args, Debug)]
pub struct AdpcmArgs {
    /// Input file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Sample rate written to a WAV output, in Hz.
    #[arg(long, default_value_t = voxlink_session::config::DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a timeout such as `5s` or `500ms`. Zero is rejected.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let duration = parse_delay(input)?;
    if duration.is_zero() {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }
    Ok(duration)
}

/// Parse a pause such as `5ms` or `1s`. Zero is allowed.
pub fn parse_delay(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_delay_allows_zero() {
        assert_eq!(parse_delay("0ms").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("5ms").unwrap(), Duration::from_millis(5));
        assert_eq!(parse_delay("-1s").unwrap_err().code, USAGE);
    }
}
