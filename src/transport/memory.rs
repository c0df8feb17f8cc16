//! In-process transport backed by a tokio channel.
//!
//! A linked sender/receiver pair for wiring components inside one process
//! and for tests, with the same observable semantics as the pipe transport:
//! FIFO delivery, fire-and-forget once the receiver is gone, no-op
//! settlement, and a `close` that waits for the dispatch loop to exit. No
//! codec runs on this path — envelopes cross the channel as values.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::envelope::Envelope;
use crate::transport::dispatch::spawn_dispatch_loop;
use crate::transport::{BoxFuture, MessageHandler, Receiver, Sender};
use crate::{CourierError, Result};

/// Factory for linked in-memory sender/receiver pairs.
pub struct MemoryTransport;

impl MemoryTransport {
    /// Create a sender and receiver sharing one channel under `name`.
    #[must_use]
    pub fn pair(name: impl Into<String>) -> (MemorySender, MemoryReceiver) {
        let name = name.into();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let sender = MemorySender {
            name: name.clone(),
            queue_tx: Mutex::new(Some(queue_tx)),
        };
        let receiver = MemoryReceiver {
            name,
            inbound_rx: Mutex::new(Some(queue_rx)),
            cancel: CancellationToken::new(),
            dispatch: Mutex::new(None),
        };
        (sender, receiver)
    }
}

/// Outbound half of an in-memory pair.
pub struct MemorySender {
    name: String,
    queue_tx: Mutex<Option<mpsc::UnboundedSender<Envelope>>>,
}

impl Sender for MemorySender {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, envelope: Envelope) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let guard = self.queue_tx.lock().await;
            let Some(queue_tx) = guard.as_ref() else {
                return Err(CourierError::Closed(format!(
                    "memory sender '{}' is closed",
                    self.name
                )));
            };
            if queue_tx.send(envelope).is_err() {
                // Receiver is gone; same drop policy as the pipe transport.
                debug!(channel = %self.name, "message dropped, receiver closed");
            }
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.queue_tx.lock().await.take();
            Ok(())
        })
    }
}

/// Inbound half of an in-memory pair.
pub struct MemoryReceiver {
    name: String,
    inbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
    cancel: CancellationToken,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl Receiver for MemoryReceiver {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, handler: Arc<dyn MessageHandler>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.cancel.is_cancelled() {
                return Err(CourierError::Closed(format!(
                    "memory receiver '{}' is closed",
                    self.name
                )));
            }
            let inbound_rx = self.inbound_rx.lock().await.take();
            let Some(inbound_rx) = inbound_rx else {
                return Err(CourierError::AlreadyStarted(format!(
                    "memory receiver '{}'",
                    self.name
                )));
            };
            let handle =
                spawn_dispatch_loop(self.name.clone(), inbound_rx, handler, self.cancel.clone());
            *self.dispatch.lock().await = Some(handle);
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.cancel.cancel();
            let dispatch = self.dispatch.lock().await.take();
            if let Some(dispatch) = dispatch {
                dispatch.await.map_err(|err| {
                    CourierError::Closed(format!("dispatch loop join failed: {err}"))
                })?;
            }
            Ok(())
        })
    }
}

impl Drop for MemoryReceiver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
