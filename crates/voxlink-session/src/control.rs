use serde::{Deserialize, Serialize};
use voxlink_ir::IrFrame;

use crate::intent::IntentReply;

/// Status token carried by every control record.
pub const STATUS_OK: &str = "ok";

/// The JSON the device receives in the hex control frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub status: String,
    pub reply_text: String,
    pub control: ControlBlock,
}

/// Command fields echoed from the classifier, plus the IR code to emit.
///
/// Absent fields serialize as `null`; the device parser expects every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlBlock {
    pub has_command: bool,
    pub target: Option<String>,
    pub action: Option<String>,
    pub value: Option<String>,
    pub ir_code: Option<String>,
}

impl ControlRecord {
    pub fn new(reply: &IntentReply, ir: Option<&IrFrame>) -> Self {
        let command = &reply.command;
        Self {
            status: STATUS_OK.to_string(),
            reply_text: reply.reply.clone(),
            control: ControlBlock {
                has_command: command.has_command,
                target: command.target.clone(),
                action: command.action.clone(),
                value: command.value.clone(),
                ir_code: ir.map(IrFrame::to_hex),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
