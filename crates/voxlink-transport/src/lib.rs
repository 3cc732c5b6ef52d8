//! Blocking TCP transport for the voxlink device link.
//!
//! The device opens one connection per voice round trip and holds it for the
//! whole exchange. This crate provides:
//! - [`TcpLink`]: bind, accept and connect
//! - [`LinkStream`]: a connected stream with timeouts and write half-close
//!
//! This is the lowest layer of voxlink. Framing builds on top of
//! [`LinkStream`].

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::LinkStream;
pub use tcp::TcpLink;
