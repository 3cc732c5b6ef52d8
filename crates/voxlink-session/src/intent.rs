use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxlink_ir::ClimateCommand;

use crate::audio::ReceivedAudio;
use crate::error::CollaboratorError;

/// Reply used when the intent service fails or nothing was captured.
pub const FALLBACK_REPLY: &str = "我没听清。";
/// Reply used when the classifier answered with unparsable text.
pub const NOT_UNDERSTOOD_REPLY: &str = "我没听懂，请再说一次。";
/// Reply used when the classifier omitted its reply text.
pub const DEFAULT_ACK: &str = "我在。";

/// What the intent service made of one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentReply {
    /// Text to speak back.
    pub reply: String,
    pub command: ClimateCommand,
}

impl IntentReply {
    pub fn new(reply: impl Into<String>, command: ClimateCommand) -> Self {
        Self {
            reply: reply.into(),
            command,
        }
    }

    /// Generic reply with no command.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_REPLY, ClimateCommand::none())
    }

    pub fn not_understood() -> Self {
        Self::new(NOT_UNDERSTOOD_REPLY, ClimateCommand::none())
    }
}

#[derive(Deserialize)]
struct RawReply {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    command: Option<ClimateCommand>,
}

/// Turns one upload into a reply and an optional device command.
pub trait IntentAnalyzer {
    fn analyze(&self, audio: &ReceivedAudio) -> Result<IntentReply, CollaboratorError>;
}

/// Parse the classifier's text output.
///
/// Code fences (```` ```json ````) around the object are removed. Text that
/// is not a JSON object yields [`IntentReply::not_understood`]; a missing
/// reply yields [`DEFAULT_ACK`].
pub fn parse_intent_reply(raw_text: &str) -> IntentReply {
    let cleaned = raw_text.replace("```json", "").replace("```", "");
    match serde_json::from_str::<RawReply>(cleaned.trim()) {
        Ok(raw) => IntentReply {
            reply: raw.reply.unwrap_or_else(|| DEFAULT_ACK.to_string()),
            command: raw.command.unwrap_or_default(),
        },
        Err(err) => {
            debug!(%err, "classifier output is not a reply object");
            IntentReply::not_understood()
        }
    }
}

/// Answers every upload with the same reply.
#[derive(Debug, Clone)]
pub struct FixedIntent {
    reply: IntentReply,
}

impl FixedIntent {
    pub fn new(reply: IntentReply) -> Self {
        Self { reply }
    }

    /// Load the reply from a file holding classifier output.
    pub fn from_file(path: &Path) -> Result<Self, CollaboratorError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(parse_intent_reply(&text)))
    }

    pub fn reply(&self) -> &IntentReply {
        &self.reply
    }
}

impl Default for FixedIntent {
    fn default() -> Self {
        Self::new(IntentReply::new(DEFAULT_ACK, ClimateCommand::none()))
    }
}

impl IntentAnalyzer for FixedIntent {
    fn analyze(&self, audio: &ReceivedAudio) -> Result<IntentReply, CollaboratorError> {
        debug!(samples = audio.samples.len(), "fixed intent reply");
        Ok(self.reply.clone())
    }
}
