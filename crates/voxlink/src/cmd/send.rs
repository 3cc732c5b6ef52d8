use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;
use voxlink_codec::Encoder;
use voxlink_session::audio::has_wav_extension;
use voxlink_session::{
    connect_and_exchange, pcm_to_le_bytes, read_wav_mono, write_wav, AudioFormat, ControlRecord,
    DeviceReply,
};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{io_error, session_error, wav_error, CliResult, SUCCESS};
use crate::output::{or_null, print_record, OutputFormat};

#[derive(Serialize)]
struct SendOutput<'a> {
    upload_bytes: usize,
    control: &'a ControlRecord,
    audio_bytes: usize,
    audio_samples: usize,
    saved_reply: Option<String>,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let upload = resolve_upload(args.file.as_deref(), args.adpcm)?;

    let reply = connect_and_exchange(&args.addr, &upload, Some(timeout))
        .map_err(|err| session_error("exchange failed", err))?;
    info!(
        ir_code = ?reply.control.control.ir_code,
        audio_bytes = reply.audio.len(),
        "reply received"
    );

    let samples = reply.decode_audio();
    if let Some(path) = &args.save_reply {
        save_reply(path, &reply, &samples, args.sample_rate)?;
    }

    let out = SendOutput {
        upload_bytes: upload.len(),
        control: &reply.control,
        audio_bytes: reply.audio.len(),
        audio_samples: samples.len(),
        saved_reply: args.save_reply.as_ref().map(|p| p.display().to_string()),
    };
    let control = &reply.control.control;
    let rows = [
        ("status", reply.control.status.clone()),
        ("reply_text", reply.control.reply_text.clone()),
        ("has_command", control.has_command.to_string()),
        ("target", or_null(control.target.as_deref())),
        ("action", or_null(control.action.as_deref())),
        ("value", or_null(control.value.as_deref())),
        ("ir_code", or_null(control.ir_code.as_deref())),
        ("audio_bytes", reply.audio.len().to_string()),
    ];
    print_record(&out, &rows, &reply.audio, format);

    Ok(SUCCESS)
}

/// Bytes to upload: WAV files contribute their first channel, other files
/// are taken as raw s16le PCM. Nothing at all uploads an empty frame.
fn resolve_upload(path: Option<&Path>, adpcm: bool) -> CliResult<Vec<u8>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let pcm = if has_wav_extension(path) {
        let (samples, _) = read_wav_mono(path)
            .map_err(|err| wav_error(&format!("failed reading {}", path.display()), err))?;
        pcm_to_le_bytes(&samples)
    } else {
        fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    };

    if !adpcm {
        return Ok(pcm);
    }
    let mut out = Vec::with_capacity(pcm.len() / 4 + 1);
    let mut encoder = Encoder::new();
    encoder.push_bytes(&pcm, &mut out);
    encoder.finish(&mut out);
    Ok(out)
}

fn save_reply(path: &Path, reply: &DeviceReply, samples: &[i16], sample_rate: u32) -> CliResult<()> {
    let context = format!("failed writing {}", path.display());
    if has_wav_extension(path) {
        let audio = AudioFormat {
            channels: 1,
            sample_rate,
        };
        write_wav(path, samples, &audio).map_err(|err| session_error(&context, err))
    } else {
        fs::write(path, &reply.audio).map_err(|err| io_error(&context, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_uploads_nothing() {
        assert!(resolve_upload(None, true).unwrap().is_empty());
    }

    #[test]
    fn raw_file_is_compressed_four_to_one() {
        let path = std::env::temp_dir().join(format!("voxlink-send-{}.pcm", std::process::id()));
        fs::write(&path, vec![0u8; 400]).unwrap();

        assert_eq!(resolve_upload(Some(&path), false).unwrap().len(), 400);
        assert_eq!(resolve_upload(Some(&path), true).unwrap().len(), 100);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = resolve_upload(Some(Path::new("/nonexistent/voxlink.pcm")), false).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
