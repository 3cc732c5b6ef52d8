use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::frame::IrFrame;
use crate::settings::{IrSettings, ResolvedAttribute};

/// Device a command is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    AirConditioner,
    /// Anything else, with the classifier's token.
    Other(String),
}

impl Target {
    /// `空调`, `air_conditioner` and `ac` name the air conditioner.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some("空调") => Target::AirConditioner,
            Some(t)
                if t.eq_ignore_ascii_case("air_conditioner") || t.eq_ignore_ascii_case("ac") =>
            {
                Target::AirConditioner
            }
            Some(t) => Target::Other(t.to_string()),
            None => Target::Other(String::new()),
        }
    }
}

/// What to do with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    Adjust,
    None,
}

impl Action {
    /// `打开`/`on`, `关闭`/`off`, `调节`/`adjust`; anything else is `None`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some("打开") => Action::On,
            Some("关闭") => Action::Off,
            Some("调节") => Action::Adjust,
            Some(t) if t.eq_ignore_ascii_case("on") => Action::On,
            Some(t) if t.eq_ignore_ascii_case("off") => Action::Off,
            Some(t) if t.eq_ignore_ascii_case("adjust") => Action::Adjust,
            _ => Action::None,
        }
    }
}

/// A device command as the intent classifier reports it.
///
/// Fields keep the classifier's raw tokens so they can be echoed back to
/// the device. Use [`ClimateCommand::classify`] to interpret them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateCommand {
    #[serde(default)]
    pub has_command: bool,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    /// A number is accepted and kept as its decimal text.
    #[serde(default, deserialize_with = "value_token")]
    pub value: Option<String>,
}

/// A command with every token interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub has_command: bool,
    pub target: Target,
    pub action: Action,
    pub attribute: Option<ResolvedAttribute>,
}

impl ClimateCommand {
    /// A command that does nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(
        target: impl Into<String>,
        action: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        Self {
            has_command: true,
            target: Some(target.into()),
            action: Some(action.into()),
            value: value.map(Into::into),
        }
    }

    pub fn classify(&self) -> Classified {
        Classified {
            has_command: self.has_command,
            target: Target::from_token(self.target.as_deref()),
            action: Action::from_token(self.action.as_deref()),
            attribute: self.value.as_deref().map(ResolvedAttribute::resolve),
        }
    }

    /// Settings to transmit, or `None` when no frame should be sent.
    ///
    /// Nothing is sent without a command, for targets other than the air
    /// conditioner, or for `Off`: the protocol has no power-off code.
    pub fn settings(&self) -> Option<IrSettings> {
        let classified = self.classify();
        if !classified.has_command {
            return None;
        }
        if let Target::Other(token) = &classified.target {
            debug!(target = %token, "command is not for the air conditioner");
            return None;
        }
        if classified.action == Action::Off {
            warn!("no power-off code in the IR protocol, skipping frame");
            return None;
        }

        let mut settings = IrSettings::default();
        if let Some(attribute) = classified.attribute {
            if matches!(
                attribute,
                ResolvedAttribute::OutOfRange | ResolvedAttribute::Unrecognized
            ) {
                debug!(value = ?self.value, ?attribute, "value leaves settings unchanged");
            }
            settings.apply(attribute);
        }
        Some(settings)
    }
}

/// Encode a command into an IR frame.
pub fn encode(command: &ClimateCommand) -> Option<IrFrame> {
    let settings = command.settings()?;
    let frame = IrFrame::from_settings(&settings);
    debug!(%settings, ir_code = %frame, "IR frame encoded");
    Some(frame)
}

fn value_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}
