//! Inbound half of the pipe transport.
//!
//! `start` binds the pipe listener and spawns two background tasks: the
//! accept loop, which processes client connections strictly sequentially and
//! reads exactly one message per connection (read-to-EOF framing), and the
//! dispatch loop, which drains the internal queue and invokes the registered
//! handler. Accept, read, and decode failures are logged and treated as a
//! restart-listening trigger; once `close` has fired the cancellation token
//! the loops exit cleanly instead.

use std::sync::Arc;

use interprocess::local_socket::tokio::{prelude::*, Listener, Stream};
use interprocess::local_socket::ListenerOptions;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::codec;
use crate::config::PipeConfig;
use crate::envelope::Envelope;
use crate::transport::dispatch::spawn_dispatch_loop;
use crate::transport::{BoxFuture, MessageHandler, Receiver};
use crate::{CourierError, Result};

/// Join handles for a started receiver's background loops.
struct ReceiverTasks {
    accept: JoinHandle<()>,
    dispatch: JoinHandle<()>,
}

/// Point-to-point receiver listening on a named pipe.
///
/// Construction is cheap; `start` binds the listener. One receiver instance
/// moves Idle → Listening → Stopped: `start` may be called once, and `close`
/// is terminal.
pub struct PipeReceiver {
    name: String,
    cancel: CancellationToken,
    tasks: Mutex<Option<ReceiverTasks>>,
}

impl PipeReceiver {
    /// Create the receiver without binding anything.
    #[must_use]
    pub fn new(config: PipeConfig) -> Self {
        Self {
            name: config.name,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(None),
        }
    }
}

impl Receiver for PipeReceiver {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, handler: Arc<dyn MessageHandler>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.cancel.is_cancelled() {
                return Err(CourierError::Closed(format!(
                    "receiver for pipe '{}' is closed",
                    self.name
                )));
            }
            let mut tasks = self.tasks.lock().await;
            if tasks.is_some() {
                return Err(CourierError::AlreadyStarted(format!(
                    "receiver for pipe '{}'",
                    self.name
                )));
            }

            let listener_name = super::resolve_local_name(&self.name)?;
            let listener = ListenerOptions::new()
                .name(listener_name)
                .create_tokio()
                .map_err(|err| {
                    CourierError::Transport(format!(
                        "failed to create pipe listener '{}': {err}",
                        self.name
                    ))
                })?;
            info!(pipe = %self.name, "pipe receiver listening");

            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let accept =
                spawn_accept_loop(self.name.clone(), listener, inbound_tx, self.cancel.clone());
            let dispatch =
                spawn_dispatch_loop(self.name.clone(), inbound_rx, handler, self.cancel.clone());
            *tasks = Some(ReceiverTasks { accept, dispatch });
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.cancel.cancel();
            let tasks = self.tasks.lock().await.take();
            if let Some(tasks) = tasks {
                tasks.accept.await.map_err(|err| {
                    CourierError::Closed(format!("accept loop join failed: {err}"))
                })?;
                tasks.dispatch.await.map_err(|err| {
                    CourierError::Closed(format!("dispatch loop join failed: {err}"))
                })?;
            }
            Ok(())
        })
    }
}

impl Drop for PipeReceiver {
    fn drop(&mut self) {
        // Unblocks the loops without waiting; `close` is the graceful path.
        self.cancel.cancel();
    }
}

fn spawn_accept_loop(
    pipe: String,
    listener: Listener,
    inbound_tx: mpsc::UnboundedSender<Envelope>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let span = info_span!("pipe_accept", pipe = %pipe);
        async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("accept loop cancelled");
                        break;
                    }
                    accepted = listener.accept() => {
                        match accepted {
                            Ok(stream) => receive_one(stream, &inbound_tx, &cancel).await,
                            Err(err) => {
                                if cancel.is_cancelled() {
                                    break;
                                }
                                warn!(%err, "pipe accept failed; listening restarted");
                            }
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;
    })
}

/// Read exactly one message from an accepted connection.
///
/// Connections are processed strictly sequentially: the next accept is not
/// awaited until this connection is closed and its message queued. Read and
/// decode failures discard the connection and return to listening.
async fn receive_one(
    mut stream: Stream,
    inbound_tx: &mpsc::UnboundedSender<Envelope>,
    cancel: &CancellationToken,
) {
    let mut raw = Vec::new();
    tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        read = stream.read_to_end(&mut raw) => {
            if let Err(err) = read {
                warn!(%err, "pipe read failed; connection discarded");
                return;
            }
        }
    }
    // Prior connection is closed before the next accept proceeds.
    drop(stream);

    let text = match String::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            warn!(%err, "received non-UTF-8 message; discarded");
            return;
        }
    };
    match codec::deserialize(&text) {
        Ok(envelope) => {
            // Send fails only when the dispatch loop is gone, i.e. shutdown.
            let _ = inbound_tx.send(envelope);
        }
        Err(err) => warn!(%err, "failed to decode received message; discarded"),
    }
}
