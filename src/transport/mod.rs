//! Transport-agnostic sender/receiver abstraction.
//!
//! The traits here are the boundary contract every transport implements:
//! the named-pipe transport in [`pipe`] (the point-to-point core) and the
//! in-process channel transport in [`memory`]. Broker-backed transports
//! (`RabbitMQ`, SQS, Kafka) would implement the same surface but are external
//! collaborators, not part of this crate.
//!
//! Async trait methods are hand-written `Pin<Box<dyn Future …>>` returns;
//! no proc-macro layer sits between the trait and its implementations.

pub(crate) mod dispatch;
pub mod memory;
pub mod pipe;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::warn;

use crate::envelope::{Envelope, Headers};
use crate::{CourierError, Result};

/// Boxed future returned by the async trait methods on this surface.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outbound half of a transport: accepts envelopes for delivery.
pub trait Sender: Send + Sync {
    /// Logical name of the destination this sender writes to.
    fn name(&self) -> &str;

    /// Accept an envelope for delivery, fire-and-forget.
    ///
    /// Completion means the envelope was accepted onto the outbound queue,
    /// not that it was (or will be) delivered. The only error is attempting
    /// to send through a closed sender.
    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<()>>;

    /// Stop accepting new envelopes, attempt everything already queued, and
    /// wait for the outbound worker to exit. Idempotent.
    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

/// Inbound half of a transport: listens for envelopes and dispatches them.
pub trait Receiver: Send + Sync {
    /// Logical name of the source this receiver listens on.
    fn name(&self) -> &str;

    /// Begin listening and dispatch every received message to `handler`.
    ///
    /// Construction is cheap; this is the expensive step that binds the
    /// transport endpoint and spawns the background loops. Calling `start`
    /// a second time is an error.
    fn start(&self, handler: Arc<dyn MessageHandler>) -> BoxFuture<'_, Result<()>>;

    /// Stop listening, cancel the dispatch loop, and wait for both background
    /// loops to exit. Idempotent.
    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

/// A message as seen by a handler: payload and header accessors plus the
/// settlement operations.
///
/// For the pipe and memory transports `acknowledge`/`rollback`/`reject` are
/// trivial completions — there is no redelivery at this layer. Broker-backed
/// implementations give them real semantics.
pub trait ReceivedMessage: Send + Sync {
    /// The payload, if any.
    fn payload(&self) -> Option<&str>;

    /// All headers.
    fn headers(&self) -> &Headers;

    /// A single header value.
    fn header(&self, key: &str) -> Option<&str> {
        self.headers().get(key)
    }

    /// Mark the message successfully processed.
    ///
    /// # Errors
    ///
    /// Transport-specific; never fails for the pipe and memory transports.
    fn acknowledge(&self) -> Result<()>;

    /// Return the message for redelivery where the transport supports it.
    ///
    /// # Errors
    ///
    /// Transport-specific; never fails for the pipe and memory transports.
    fn rollback(&self) -> Result<()>;

    /// Discard the message as unprocessable.
    ///
    /// # Errors
    ///
    /// Transport-specific; never fails for the pipe and memory transports.
    fn reject(&self) -> Result<()>;
}

/// User-level message processing callback, registered at `start` time.
pub trait MessageHandler: Send + Sync {
    /// Process one received message.
    fn handle(&self, message: Box<dyn ReceivedMessage>) -> BoxFuture<'_, Result<()>>;

    /// Observation hook for per-message dispatch failures (handler errors and
    /// panics). The dispatch loop keeps running regardless; the default
    /// implementation logs and moves on.
    fn on_dispatch_error(&self, err: &CourierError) {
        warn!(%err, "message handler failed");
    }
}
