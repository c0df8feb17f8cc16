//! Point-to-point transport over local named pipes.
//!
//! A [`PipeSender`] and [`PipeReceiver`] agreeing on the same pipe name form
//! a single-hop, fire-and-forget channel: one fresh connection per message,
//! read-to-EOF framing, at-most-once delivery, no persistence or replay.
//! Pipe names resolve through the platform's local-socket namespace —
//! `\\.\pipe\<name>` on Windows, a namespaced socket on Unix.

pub mod receiver;
pub mod sender;

pub use receiver::PipeReceiver;
pub use sender::PipeSender;

use interprocess::local_socket::{GenericNamespaced, Name, ToNsName};

use crate::{CourierError, Result};

/// Resolve a configured pipe name into a platform local-socket name.
pub(crate) fn resolve_local_name(pipe: &str) -> Result<Name<'static>> {
    pipe.to_owned()
        .to_ns_name::<GenericNamespaced>()
        .map_err(|err| CourierError::Connect(format!("invalid pipe name '{pipe}': {err}")))
}
