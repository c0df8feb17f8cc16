//! Dispatch loop shared by the pipe and memory receivers.
//!
//! A single background task drains a receiver's inbound queue and invokes
//! the registered [`MessageHandler`] for each envelope, decoupling transport
//! I/O from user-level message processing. Handler errors and panics are
//! contained per message and surfaced through the handler's
//! `on_dispatch_error` hook; only cancellation or queue closure ends the
//! loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use crate::envelope::{Envelope, Headers};
use crate::transport::{MessageHandler, ReceivedMessage};
use crate::{CourierError, Result};

/// A received envelope wrapped for hand-off to a handler.
///
/// Settlement is a no-op at this layer: there is no redelivery mechanism, so
/// acknowledge, rollback, and reject are all trivial completions.
pub(crate) struct InboundMessage {
    envelope: Envelope,
}

impl InboundMessage {
    pub(crate) fn new(envelope: Envelope) -> Self {
        Self { envelope }
    }
}

impl ReceivedMessage for InboundMessage {
    fn payload(&self) -> Option<&str> {
        self.envelope.body()
    }

    fn headers(&self) -> &Headers {
        self.envelope.headers()
    }

    fn acknowledge(&self) -> Result<()> {
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        Ok(())
    }

    fn reject(&self) -> Result<()> {
        Ok(())
    }
}

/// Spawn the dispatch loop task for one receiver.
///
/// The loop exits when `cancel` fires or when the inbound queue closes
/// (every producer dropped). Envelopes already queued at cancellation time
/// are not dispatched; shutdown wins.
pub(crate) fn spawn_dispatch_loop(
    name: String,
    mut inbound_rx: mpsc::UnboundedReceiver<Envelope>,
    handler: Arc<dyn MessageHandler>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let span = info_span!("dispatch", source = %name);
        async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("dispatch loop cancelled");
                        break;
                    }
                    received = inbound_rx.recv() => {
                        let Some(envelope) = received else {
                            debug!("inbound queue closed; dispatch loop exiting");
                            break;
                        };
                        dispatch_one(handler.as_ref(), envelope).await;
                    }
                }
            }
        }
        .instrument(span)
        .await;
    })
}

/// Invoke the handler for one envelope, containing errors and panics.
///
/// Containment covers both halves of the call: the synchronous part of
/// `handle` (everything before its future is constructed) and the awaited
/// future itself. Either way the panic becomes a `Handler` error on the
/// observation hook and the loop keeps running.
async fn dispatch_one(handler: &dyn MessageHandler, envelope: Envelope) {
    let message: Box<dyn ReceivedMessage> = Box::new(InboundMessage::new(envelope));
    let future = match std::panic::catch_unwind(AssertUnwindSafe(|| handler.handle(message))) {
        Ok(future) => future,
        Err(panic) => {
            let err = CourierError::Handler(format!("handler panicked: {}", panic_text(&panic)));
            handler.on_dispatch_error(&err);
            return;
        }
    };
    let outcome = AssertUnwindSafe(future).catch_unwind().await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            let err = CourierError::Handler(err.to_string());
            handler.on_dispatch_error(&err);
        }
        Err(panic) => {
            let err = CourierError::Handler(format!("handler panicked: {}", panic_text(&panic)));
            handler.on_dispatch_error(&err);
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_text(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = panic.downcast_ref::<&str>() {
        text
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}
