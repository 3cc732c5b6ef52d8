mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "voxlink",
    version,
    about = "Voice device link: serve round trips, encode IR frames, convert ADPCM"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", env = "VOXLINK_LOG_FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", env = "VOXLINK_LOG_LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "voxlink",
            "send",
            "127.0.0.1:9000",
            "--file",
            "/tmp/utterance.wav",
            "--adpcm",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_ir_args() {
        let err = Cli::try_parse_from([
            "voxlink",
            "ir",
            "25",
            "--json",
            r#"{"has_command":true}"#,
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_conflicting_intent_sources() {
        let err = Cli::try_parse_from([
            "voxlink",
            "serve",
            "--reply",
            "ok",
            "--intent-file",
            "/tmp/intent.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_adpcm_subcommands() {
        let cli = Cli::try_parse_from(["voxlink", "adpcm", "decode", "in.adpcm", "out.wav"])
            .expect("adpcm args should parse");
        assert!(matches!(
            cli.command,
            Command::Adpcm(cmd::AdpcmCommand::Decode(_))
        ));
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["voxlink", "ir", "high", "--format", "json"])
            .expect("global flag should parse after subcommand");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
