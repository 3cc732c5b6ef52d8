use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;
use voxlink_frame::{IngestConfig, PacingConfig};
use voxlink_session::{
    AudioFormat, FixedIntent, IntentReply, Server, ServerConfig, SessionReport, SilentSynthesizer,
    WavSynthesizer,
};

use crate::cmd::{parse_delay, parse_duration, ServeArgs};
use crate::exit::{collaborator_error, session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{or_null, print_record, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = server_config(&args)?;

    let analyzer = match (&args.intent_file, &args.reply) {
        (Some(path), _) => FixedIntent::from_file(path).map_err(|err| {
            collaborator_error(&format!("failed reading {}", path.display()), err)
        })?,
        (None, Some(text)) => FixedIntent::new(IntentReply::new(
            text.clone(),
            voxlink_ir::ClimateCommand::none(),
        )),
        (None, None) => FixedIntent::default(),
    };
    info!(reply = %analyzer.reply().reply, "intent source ready");

    let server = Server::bind(args.listen.as_str())
        .map_err(|err| session_error("bind failed", err))?
        .with_config(config)
        .map_err(|err| session_error("invalid config", err))?
        .with_analyzer(analyzer);
    let server = match &args.speech_wav {
        Some(path) => server.with_synthesizer(WavSynthesizer::new(path)),
        None => server.with_synthesizer(SilentSynthesizer),
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut completed = 0usize;
    server
        .serve(&running, |report| {
            print_report(report, format);
            completed = completed.saturating_add(1);
            if args.count.is_some_and(|count| completed >= count) {
                running.store(false, Ordering::SeqCst);
            }
        })
        .map_err(|err| session_error("accept failed", err))?;

    Ok(SUCCESS)
}

fn server_config(args: &ServeArgs) -> CliResult<ServerConfig> {
    Ok(ServerConfig {
        ingest: IngestConfig {
            max_payload_size: args.max_payload,
            read_timeout: Some(parse_duration(&args.read_timeout)?),
        },
        pacing: PacingConfig {
            chunk_size: args.chunk_size,
            chunk_delay: parse_delay(&args.chunk_delay)?,
        },
        ingest_format: args.ingest_format.into(),
        save_path: args.save_audio.clone(),
        audio: AudioFormat {
            channels: args.wav_channels,
            sample_rate: args.sample_rate,
        },
        reply_delay: parse_delay(&args.reply_delay)?,
    })
}

fn print_report(report: &SessionReport, format: OutputFormat) {
    let rows = [
        ("reply_text", report.reply_text.clone()),
        ("ir_code", or_null(report.ir_code.as_deref())),
        ("ingest_bytes", report.ingest_bytes.to_string()),
        ("upload_ms", report.upload_ms.to_string()),
        ("control_bytes", report.control_bytes.to_string()),
        ("audio_bytes", report.audio_bytes.to_string()),
        ("elapsed_ms", report.elapsed_ms.to_string()),
    ];
    let raw = format!("{}\n", or_null(report.ir_code.as_deref()));
    print_record(report, &rows, raw.as_bytes(), format);
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
