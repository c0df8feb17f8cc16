//! Outbound half of the pipe transport.
//!
//! `send` is fire-and-forget: it serializes the envelope and enqueues the
//! wire text onto an unbounded queue, returning before any I/O happens. One
//! dedicated worker task drains the queue in FIFO order and, per message,
//! opens a fresh connection to the destination pipe, writes the text, and
//! closes the connection (the close is the message boundary).
//!
//! When no receiver is listening the connect attempt fails fast and the
//! message is silently dropped — no retry, no buffering beyond the queue.
//! Downstream code relies on these semantics; they are policy, not a bug.

use std::time::Duration;

use interprocess::local_socket::tokio::{prelude::*, Stream};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info_span, Instrument};

use crate::codec;
use crate::config::PipeConfig;
use crate::envelope::{Envelope, ORIGINATING_SYSTEM_HEADER};
use crate::transport::{BoxFuture, Sender};
use crate::{CourierError, Result};

/// Fire-and-forget sender writing to a named pipe.
pub struct PipeSender {
    name: String,
    origin_system: String,
    queue_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PipeSender {
    /// Create the sender and spawn its outbound worker.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Connect` if the configured pipe name cannot be
    /// resolved to a local-socket name. Resolution happens here so a bad
    /// name fails construction instead of silently dropping every message
    /// inside the worker.
    pub fn new(config: PipeConfig) -> Result<Self> {
        super::resolve_local_name(&config.name)?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let worker = spawn_outbound_worker(config.name.clone(), config.connect_timeout_ms, queue_rx);
        Ok(Self {
            name: config.name,
            origin_system: config.origin_system,
            queue_tx: Mutex::new(Some(queue_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }
}

impl Sender for PipeSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, mut envelope: Envelope) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if !envelope.headers().contains_key(ORIGINATING_SYSTEM_HEADER) {
                envelope
                    .headers_mut()
                    .insert(ORIGINATING_SYSTEM_HEADER, self.origin_system.clone());
            }
            let text = codec::serialize(&envelope);
            let guard = self.queue_tx.lock().await;
            let Some(queue_tx) = guard.as_ref() else {
                return Err(CourierError::Closed(format!(
                    "sender for pipe '{}' is closed",
                    self.name
                )));
            };
            queue_tx.send(text).map_err(|_| {
                CourierError::Closed(format!(
                    "outbound worker for pipe '{}' has exited",
                    self.name
                ))
            })
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            // Dropping the queue sender lets the worker drain what is already
            // enqueued and then exit.
            self.queue_tx.lock().await.take();
            let worker = self.worker.lock().await.take();
            if let Some(worker) = worker {
                worker.await.map_err(|err| {
                    CourierError::Closed(format!("outbound worker join failed: {err}"))
                })?;
            }
            Ok(())
        })
    }
}

impl Drop for PipeSender {
    fn drop(&mut self) {
        // Signal the worker to drain and exit without waiting on it.
        if let Ok(mut guard) = self.queue_tx.try_lock() {
            guard.take();
        }
    }
}

fn spawn_outbound_worker(
    pipe: String,
    connect_timeout_ms: u64,
    mut queue_rx: mpsc::UnboundedReceiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let span = info_span!("outbound_worker", pipe = %pipe);
        async move {
            while let Some(text) = queue_rx.recv().await {
                if let Err(err) = transmit(&pipe, connect_timeout_ms, &text).await {
                    // Fire-and-forget: the message is dropped and the loop
                    // moves on to the next item.
                    debug!(%err, "message dropped");
                }
            }
            debug!("outbound worker exiting");
        }
        .instrument(span)
        .await;
    })
}

/// Deliver one serialized message over a fresh pipe connection.
async fn transmit(pipe: &str, connect_timeout_ms: u64, text: &str) -> Result<()> {
    let name = super::resolve_local_name(pipe)?;
    let mut stream = timeout(Duration::from_millis(connect_timeout_ms), Stream::connect(name))
        .await
        .map_err(|_| {
            CourierError::Connect(format!(
                "connect to pipe '{pipe}' timed out after {connect_timeout_ms}ms"
            ))
        })?
        .map_err(|err| CourierError::Connect(format!("connect to pipe '{pipe}' failed: {err}")))?;

    stream
        .write_all(text.as_bytes())
        .await
        .map_err(|err| CourierError::Transport(format!("pipe write failed: {err}")))?;
    stream
        .flush()
        .await
        .map_err(|err| CourierError::Transport(format!("pipe flush failed: {err}")))?;

    // Dropping the stream closes the connection; the close is the message
    // boundary the receiver reads to.
    Ok(())
}
