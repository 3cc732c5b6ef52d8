use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use voxlink_codec::Encoder;
use voxlink_frame::{HexFrameWriter, IngestReader, RawAudioWriter};
use voxlink_transport::LinkStream;

use crate::audio::ReceivedAudio;
use crate::config::ServerConfig;
use crate::control::ControlRecord;
use crate::error::Result;
use crate::intent::{IntentAnalyzer, IntentReply};
use crate::speech::SpeechSynthesizer;

/// Samples encoded per raw egress write.
const ENCODE_BATCH_SAMPLES: usize = 4096;

/// Summary of one completed round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub ingest_bytes: usize,
    /// Playback length of the upload.
    pub upload_ms: u64,
    pub reply_text: String,
    pub ir_code: Option<String>,
    /// Hex characters sent, terminator included.
    pub control_bytes: usize,
    pub audio_samples: usize,
    pub audio_bytes: u64,
    pub elapsed_ms: u64,
}

/// Run one voice round trip over `stream`, then half-close it.
///
/// Ingest errors end the session with nothing sent. Collaborator failures
/// are replaced with a fallback reply or silence and never reach the
/// device.
pub fn run_session(
    stream: LinkStream,
    config: &ServerConfig,
    analyzer: &dyn IntentAnalyzer,
    synthesizer: &dyn SpeechSynthesizer,
) -> Result<SessionReport> {
    let started = Instant::now();

    let mut reader = IngestReader::with_config_link(stream, config.ingest.clone())?;
    let frame = reader.read_frame()?;
    let stream = reader.into_inner();
    stream.set_read_timeout(None)?;
    let audio = ReceivedAudio::from_payload(frame.payload, config.ingest_format);
    let upload_ms = audio.duration_ms(&config.audio);
    info!(
        bytes = audio.payload.len(),
        format = %audio.format,
        upload_ms,
        "upload received"
    );
    if let Some(path) = &config.save_path {
        if let Err(err) = audio.save(path, &config.audio) {
            warn!(path = %path.display(), %err, "could not save received audio");
        }
    }

    let reply = if audio.is_empty() {
        debug!("empty upload, skipping intent analysis");
        IntentReply::fallback()
    } else {
        analyzer.analyze(&audio).unwrap_or_else(|err| {
            warn!(%err, "intent analysis failed, using fallback reply");
            IntentReply::fallback()
        })
    };

    let ir = voxlink_ir::encode(&reply.command);
    let record = ControlRecord::new(&reply, ir.as_ref());
    let json = record.to_json()?;

    let samples = synthesizer.synthesize(&reply.reply).unwrap_or_else(|err| {
        warn!(%err, "speech synthesis failed, replying without audio");
        Vec::new()
    });
    info!(
        reply = %reply.reply,
        ir_code = ?record.control.ir_code,
        samples = samples.len(),
        "reply ready"
    );

    if !config.reply_delay.is_zero() {
        std::thread::sleep(config.reply_delay);
    }

    let mut hex = HexFrameWriter::with_config_link(stream, config.pacing.clone())?;
    let control_bytes = hex.send(&json)?;
    let stream = hex.into_inner();

    let mut raw = RawAudioWriter::with_config_link(stream, config.pacing.clone())?;
    let mut encoder = Encoder::new();
    let mut adpcm = Vec::with_capacity(ENCODE_BATCH_SAMPLES / 2 + 1);
    for batch in samples.chunks(ENCODE_BATCH_SAMPLES) {
        encoder.push_samples(batch, &mut adpcm);
        raw.send(&adpcm)?;
        adpcm.clear();
    }
    encoder.finish(&mut adpcm);
    raw.send(&adpcm)?;
    let audio_bytes = raw.bytes_sent();
    let _stream = raw.finish_link()?;

    let report = SessionReport {
        ingest_bytes: audio.payload.len(),
        upload_ms,
        reply_text: reply.reply,
        ir_code: record.control.ir_code,
        control_bytes,
        audio_samples: samples.len(),
        audio_bytes,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    info!(
        audio_bytes = report.audio_bytes,
        elapsed_ms = report.elapsed_ms,
        "session complete"
    );
    Ok(report)
}
