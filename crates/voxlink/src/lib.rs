//! Link between a voice-controlled microcontroller and a voice-intent
//! service, over one raw byte stream per utterance.
//!
//! # Crate Structure
//!
//! - [`codec`]: IMA-ADPCM encoder and decoder
//! - [`transport`]: Blocking TCP listener and link stream
//! - [`frame`]: Length-prefixed ingest, paced hex and raw egress
//! - [`ir`]: Air-conditioner IR frames from classifier commands
//! - [`session`]: Round-trip pipeline and accept loop (behind `session` feature)

/// Re-export codec types.
pub mod codec {
    pub use voxlink_codec::*;
}

/// Re-export transport types.
pub mod transport {
    pub use voxlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use voxlink_frame::*;
}

/// Re-export IR types.
pub mod ir {
    pub use voxlink_ir::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use voxlink_session::*;
}
