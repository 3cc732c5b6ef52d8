use serde::Serialize;
use voxlink_ir::{ClimateCommand, IrFrame, IrSettings};

use crate::cmd::IrArgs;
use crate::exit::{ir_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{or_null, print_record, OutputFormat};

#[derive(Debug, Serialize, PartialEq)]
struct IrOutput {
    ir_code: Option<String>,
    temperature: Option<u8>,
    mode: Option<&'static str>,
    fan: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pulses: Option<Vec<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    carrier_hz: Option<u32>,
}

impl IrOutput {
    fn new(settings: Option<IrSettings>, frame: Option<IrFrame>, with_pulses: bool) -> Self {
        let with_pulses = with_pulses && frame.is_some();
        Self {
            ir_code: frame.map(|f| f.to_hex()),
            temperature: settings.map(|s| s.temperature),
            mode: settings.map(|s| s.mode.as_str()),
            fan: settings.map(|s| s.fan.as_str()),
            pulses: frame.filter(|_| with_pulses).map(|f| f.pulses()),
            carrier_hz: with_pulses.then_some(voxlink_ir::CARRIER_HZ),
        }
    }
}

pub fn run(args: IrArgs, format: OutputFormat) -> CliResult<i32> {
    let out = if let Some(text) = &args.decode {
        let frame = IrFrame::from_hex(text).map_err(|err| ir_error("invalid IR code", err))?;
        IrOutput::new(None, Some(frame), args.pulses)
    } else {
        let command = resolve_command(&args)?;
        let settings = command.settings();
        IrOutput::new(settings, settings.map(IrFrame::from), args.pulses)
    };

    let rows = [
        ("ir_code", or_null(out.ir_code.as_deref())),
        (
            "temperature",
            out.temperature
                .map(|t| t.to_string())
                .unwrap_or_else(|| "null".to_string()),
        ),
        ("mode", or_null(out.mode)),
        ("fan", or_null(out.fan)),
    ];
    let raw = format!("{}\n", or_null(out.ir_code.as_deref()));
    print_record(&out, &rows, raw.as_bytes(), format);

    Ok(SUCCESS)
}

fn resolve_command(args: &IrArgs) -> CliResult<ClimateCommand> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json)
            .map_err(|err| CliError::new(DATA_INVALID, format!("--json is not a command: {err}")));
    }
    Ok(ClimateCommand::new(
        args.target.clone(),
        args.action.clone(),
        args.value.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Option<&str>) -> IrArgs {
        IrArgs {
            value: value.map(str::to_string),
            target: "空调".to_string(),
            action: "调节".to_string(),
            json: None,
            decode: None,
            pulses: false,
        }
    }

    #[test]
    fn value_becomes_frame() {
        let command = resolve_command(&args(Some("16"))).unwrap();
        let settings = command.settings();
        let out = IrOutput::new(settings, settings.map(IrFrame::from), false);
        assert_eq!(out.ir_code.as_deref(), Some("B24DA05FD02F"));
        assert_eq!(out.temperature, Some(26));
        assert_eq!(out.pulses, None);
    }

    #[test]
    fn json_command_is_parsed() {
        let mut a = args(None);
        a.json = Some(r#"{"has_command":true,"target":"空调","action":"关闭"}"#.to_string());
        let command = resolve_command(&a).unwrap();
        assert_eq!(command.settings(), None);
    }

    #[test]
    fn bad_json_is_data_invalid() {
        let mut a = args(None);
        a.json = Some("{".to_string());
        assert_eq!(resolve_command(&a).unwrap_err().code, DATA_INVALID);
    }

    #[test]
    fn pulses_only_with_frame() {
        let out = IrOutput::new(None, None, true);
        assert_eq!(out.pulses, None);
        assert_eq!(out.carrier_hz, None);

        let frame = IrFrame::from(IrSettings::default());
        let out = IrOutput::new(None, Some(frame), true);
        assert_eq!(out.pulses.map(|p| p.len()), Some(99));
        assert_eq!(out.carrier_hz, Some(38_000));
    }
}
