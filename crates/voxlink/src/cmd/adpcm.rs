use std::fs;
use std::path::Path;

use serde::Serialize;
use voxlink_codec::{CodecState, Decoder, Encoder};
use voxlink_session::audio::has_wav_extension;
use voxlink_session::{pcm_to_le_bytes, read_wav_mono, write_wav, AudioFormat};

use crate::cmd::{AdpcmArgs, AdpcmCommand};
use crate::exit::{io_error, session_error, wav_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct CodecOutput {
    operation: &'static str,
    input: String,
    output: String,
    input_bytes: usize,
    output_bytes: usize,
    samples: usize,
    final_predictor: i16,
    final_step_index: u8,
}

pub fn run(command: AdpcmCommand, format: OutputFormat) -> CliResult<i32> {
    let out = match command {
        AdpcmCommand::Encode(args) => encode(&args)?,
        AdpcmCommand::Decode(args) => decode(&args)?,
    };

    let rows = [
        ("operation", out.operation.to_string()),
        ("input", out.input.clone()),
        ("output", out.output.clone()),
        ("input_bytes", out.input_bytes.to_string()),
        ("output_bytes", out.output_bytes.to_string()),
        ("samples", out.samples.to_string()),
    ];
    let raw = format!("{}\n", out.output_bytes);
    print_record(&out, &rows, raw.as_bytes(), format);

    Ok(SUCCESS)
}

fn encode(args: &AdpcmArgs) -> CliResult<CodecOutput> {
    let (pcm, input_bytes) = read_pcm(&args.input)?;

    let mut adpcm = Vec::with_capacity(pcm.len() / 4 + 1);
    let mut encoder = Encoder::new();
    encoder.push_bytes(&pcm, &mut adpcm);
    let state = encoder.finish(&mut adpcm);

    fs::write(&args.output, &adpcm)
        .map_err(|err| io_error(&format!("failed writing {}", args.output.display()), err))?;

    Ok(output(
        "encode",
        args,
        input_bytes,
        adpcm.len(),
        pcm.len() / 2,
        state,
    ))
}

fn decode(args: &AdpcmArgs) -> CliResult<CodecOutput> {
    let adpcm = fs::read(&args.input)
        .map_err(|err| io_error(&format!("failed reading {}", args.input.display()), err))?;

    let mut samples = Vec::with_capacity(adpcm.len() * 2);
    let mut decoder = Decoder::new();
    decoder.push(&adpcm, &mut samples);

    let context = format!("failed writing {}", args.output.display());
    let output_bytes = if has_wav_extension(&args.output) {
        let audio = AudioFormat {
            channels: 1,
            sample_rate: args.sample_rate,
        };
        write_wav(&args.output, &samples, &audio).map_err(|err| session_error(&context, err))?;
        fs::metadata(&args.output)
            .map(|m| m.len() as usize)
            .map_err(|err| io_error(&context, err))?
    } else {
        let pcm = pcm_to_le_bytes(&samples);
        fs::write(&args.output, &pcm).map_err(|err| io_error(&context, err))?;
        pcm.len()
    };

    Ok(output(
        "decode",
        args,
        adpcm.len(),
        output_bytes,
        samples.len(),
        decoder.state(),
    ))
}

/// PCM bytes from a WAV (first channel) or raw s16le file, plus the size
/// of the file as read.
fn read_pcm(path: &Path) -> CliResult<(Vec<u8>, usize)> {
    let context = format!("failed reading {}", path.display());
    if has_wav_extension(path) {
        let (samples, _) = read_wav_mono(path).map_err(|err| wav_error(&context, err))?;
        let size = fs::metadata(path)
            .map(|m| m.len() as usize)
            .map_err(|err| io_error(&context, err))?;
        Ok((pcm_to_le_bytes(&samples), size))
    } else {
        let pcm = fs::read(path).map_err(|err| io_error(&context, err))?;
        let size = pcm.len();
        Ok((pcm, size))
    }
}

fn output(
    operation: &'static str,
    args: &AdpcmArgs,
    input_bytes: usize,
    output_bytes: usize,
    samples: usize,
    state: CodecState,
) -> CodecOutput {
    CodecOutput {
        operation,
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        input_bytes,
        output_bytes,
        samples,
        final_predictor: state.predictor(),
        final_step_index: state.step_index(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voxlink-adpcm-{}-{name}", std::process::id()))
    }

    #[test]
    fn encode_then_decode_files() {
        let pcm_path = temp_path("in.pcm");
        let adpcm_path = temp_path("mid.adpcm");
        let wav_path = temp_path("out.wav");

        let samples: Vec<i16> = (0..200).map(|i| ((i % 20) * 500) as i16).collect();
        fs::write(&pcm_path, pcm_to_le_bytes(&samples)).unwrap();

        let encoded = encode(&AdpcmArgs {
            input: pcm_path.clone(),
            output: adpcm_path.clone(),
            sample_rate: 16_000,
        })
        .unwrap();
        assert_eq!(encoded.output_bytes, 100);
        assert_eq!(encoded.samples, 200);

        let decoded = decode(&AdpcmArgs {
            input: adpcm_path.clone(),
            output: wav_path.clone(),
            sample_rate: 8_000,
        })
        .unwrap();
        assert_eq!(decoded.samples, 200);
        assert_eq!(decoded.final_predictor, encoded.final_predictor);
        assert_eq!(decoded.final_step_index, encoded.final_step_index);

        let (roundtrip, format) = read_wav_mono(&wav_path).unwrap();
        assert_eq!(roundtrip.len(), 200);
        assert_eq!(format.sample_rate, 8_000);

        for path in [pcm_path, adpcm_path, wav_path] {
            let _ = fs::remove_file(path);
        }
    }
}
