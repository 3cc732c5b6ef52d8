//! Voice round trips between the device link and intent/speech services.
//!
//! One session is one connection: the device uploads audio, the server
//! works out a reply and an optional IR command, then answers with a hex
//! control frame followed by ADPCM reply audio and a write half-close.
//! Sessions run strictly one at a time.

pub mod audio;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod intent;
pub mod server;
pub mod session;
pub mod speech;

pub use audio::{pcm_from_le_bytes, pcm_to_le_bytes, read_wav_mono, write_wav, ReceivedAudio};
pub use config::{AudioFormat, IngestFormat, ServerConfig, DEFAULT_REPLY_DELAY};
pub use control::{ControlBlock, ControlRecord, STATUS_OK};
pub use device::{connect_and_exchange, exchange, DeviceReply};
pub use error::{CollaboratorError, Result, SessionError};
pub use intent::{
    parse_intent_reply, FixedIntent, IntentAnalyzer, IntentReply, DEFAULT_ACK, FALLBACK_REPLY,
    NOT_UNDERSTOOD_REPLY,
};
pub use server::Server;
pub use session::{run_session, SessionReport};
pub use speech::{SilentSynthesizer, SpeechSynthesizer, WavSynthesizer};
