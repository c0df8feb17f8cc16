//! In-memory transport tests: the pipe transport's observable semantics
//! reproduced over an in-process channel, plus registry-routed dispatch.

use std::sync::Arc;
use std::time::Duration;

use pipe_courier::registry::HandlerRegistry;
use pipe_courier::transport::memory::MemoryTransport;
use pipe_courier::transport::{Receiver, Sender};
use pipe_courier::{CourierError, Envelope};

use super::test_helpers::{wait_until, CollectHandler};

/// Messages flow sender → dispatch loop in FIFO order.
#[tokio::test]
async fn pair_delivers_fifo() {
    let (sender, receiver) = MemoryTransport::pair("mem-fifo");
    assert_eq!(sender.name(), "mem-fifo");
    assert_eq!(receiver.name(), "mem-fifo");

    let handler = CollectHandler::new();
    receiver
        .start(handler.clone())
        .await
        .expect("receiver must start");

    for payload in ["one", "two", "three"] {
        sender.send(Envelope::new(payload)).await.expect("send");
    }

    assert!(
        wait_until(|| handler.count() == 3, Duration::from_secs(5)).await,
        "all messages must be dispatched"
    );
    assert_eq!(handler.payloads(), vec!["one", "two", "three"]);

    sender.close().await.expect("sender close");
    receiver.close().await.expect("receiver close");
}

/// Messages sent before `start` queue up and are dispatched once the
/// receiver starts.
#[tokio::test]
async fn queued_before_start_delivered_after_start() {
    let (sender, receiver) = MemoryTransport::pair("mem-early");
    sender.send(Envelope::new("early")).await.expect("send");

    let handler = CollectHandler::new();
    receiver
        .start(handler.clone())
        .await
        .expect("receiver must start");

    assert!(
        wait_until(|| handler.count() == 1, Duration::from_secs(5)).await,
        "queued message must be dispatched after start"
    );
    assert_eq!(handler.payloads(), vec!["early"]);

    sender.close().await.expect("sender close");
    receiver.close().await.expect("receiver close");
}

/// Sending once the receiver is closed is a silent drop, matching the pipe
/// transport's fire-and-forget policy.
#[tokio::test]
async fn send_after_receiver_closed_drops_silently() {
    let (sender, receiver) = MemoryTransport::pair("mem-drop");
    let handler = CollectHandler::new();
    receiver
        .start(handler.clone())
        .await
        .expect("receiver must start");
    receiver.close().await.expect("receiver close");

    sender
        .send(Envelope::new("ghost"))
        .await
        .expect("send after receiver close must still complete");
    assert_eq!(handler.count(), 0, "dropped message must not be observed");

    sender.close().await.expect("sender close");
}

/// Sending through a closed sender is an error, not a drop.
#[tokio::test]
async fn send_after_sender_close_errors() {
    let (sender, _receiver) = MemoryTransport::pair("mem-closed");
    sender.close().await.expect("sender close");

    let result = sender.send(Envelope::new("late")).await;
    assert!(matches!(result, Err(CourierError::Closed(_))));
}

/// `start` is single-shot per receiver instance.
#[tokio::test]
async fn start_twice_errors() {
    let (_sender, receiver) = MemoryTransport::pair("mem-double");
    let handler = CollectHandler::new();
    receiver
        .start(handler.clone())
        .await
        .expect("first start must succeed");

    let second = receiver.start(handler.clone()).await;
    assert!(matches!(second, Err(CourierError::AlreadyStarted(_))));

    receiver.close().await.expect("receiver close");
}

/// A handler that panics synchronously — before its future is constructed —
/// is contained exactly like one that panics mid-future: the error hook
/// fires, the dispatch loop survives, and later messages still arrive.
#[tokio::test]
async fn sync_handler_panic_does_not_stop_dispatch() {
    let (sender, receiver) = MemoryTransport::pair("mem-sync-panic");
    let handler = CollectHandler::sync_panicking_on("poison");
    receiver
        .start(handler.clone())
        .await
        .expect("receiver must start");

    sender.send(Envelope::new("poison")).await.expect("send poison");
    sender.send(Envelope::new("healthy")).await.expect("send healthy");

    assert!(
        wait_until(
            || handler.count() == 1 && handler.error_count() == 1,
            Duration::from_secs(5)
        )
        .await,
        "the sync panic must be observed and the healthy message dispatched, \
         got count {} / errors {}",
        handler.count(),
        handler.error_count()
    );
    assert_eq!(handler.payloads(), vec!["healthy"]);

    sender.close().await.expect("sender close");
    receiver
        .close()
        .await
        .expect("close must join a dispatch loop that survived the panic");
}

/// A registry-backed handler routes messages by type tag over the memory
/// transport; handler failures (unroutable messages) are contained.
#[tokio::test]
async fn registry_routes_over_memory_transport() {
    let (sender, receiver) = MemoryTransport::pair("mem-registry");

    let orders = CollectHandler::new();
    let invoices = CollectHandler::new();
    let mut registry = HandlerRegistry::new("MessageType");
    registry.register("order", orders.clone());
    registry.register("invoice", invoices.clone());

    receiver
        .start(registry.into_handler())
        .await
        .expect("receiver must start");

    sender
        .send(Envelope::new("o1").with_header("MessageType", "order"))
        .await
        .expect("send order");
    sender
        .send(Envelope::new("i1").with_header("MessageType", "invoice"))
        .await
        .expect("send invoice");
    sender
        .send(Envelope::new("x1").with_header("MessageType", "unknown"))
        .await
        .expect("send unroutable");
    sender
        .send(Envelope::new("o2").with_header("MessageType", "order"))
        .await
        .expect("send second order");

    assert!(
        wait_until(
            || orders.count() == 2 && invoices.count() == 1,
            Duration::from_secs(5)
        )
        .await,
        "routed messages must reach their handlers despite the unroutable one"
    );
    assert_eq!(orders.payloads(), vec!["o1", "o2"]);
    assert_eq!(invoices.payloads(), vec!["i1"]);

    sender.close().await.expect("sender close");
    receiver.close().await.expect("receiver close");
}
