#![forbid(unsafe_code)]

//! Point-to-point messaging over local named pipes.
//!
//! The crate exposes a transport-agnostic [`transport::Sender`] /
//! [`transport::Receiver`] surface with two implementations: the named-pipe
//! transport (the core — fire-and-forget, one connection per message, a
//! hand-rolled wire codec) and an in-process channel transport for local
//! wiring and tests. Broker-backed transports implement the same traits but
//! live outside this crate.

pub mod codec;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod registry;
pub mod transport;

pub use config::CourierConfig;
pub use envelope::{Envelope, Headers};
pub use errors::{CourierError, Result};
