//! Infrared frames for a fixed air-conditioner remote protocol.
//!
//! A [`ClimateCommand`] from the intent classifier is resolved into
//! [`IrSettings`] (temperature, mode, fan) and packed into a six-byte
//! [`IrFrame`] whose check bytes are the complements of the data bytes.
//! The frame travels to the device as twelve hex characters; the device
//! turns it into the mark/space train from [`IrFrame::pulses`].

pub mod command;
pub mod error;
pub mod frame;
pub mod settings;

pub use command::{encode, Action, Classified, ClimateCommand, Target};
pub use error::{IrError, Result};
pub use frame::{IrFrame, CARRIER_HZ, FRAME_LEN};
pub use settings::{
    temperature_nibble, FanSpeed, IrSettings, Mode, ResolvedAttribute, DEFAULT_TEMPERATURE,
    MAX_TEMPERATURE, MIN_TEMPERATURE,
};
