//! Mock [`MessageStream`] implementations for testing.
//!
//! - [`ScriptedStream`] - Pre-loaded connect/subscribe results and messages.
//!   Best for: error handling and consumer loop behavior.
//!
//! - [`ChannelStream`] - Channel-backed stream with external control handle.
//!   Best for: integration tests needing on-demand message delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::port::outbound::stream::{MessageStream, RawMessage};

// ---------------------------------------------------------------------------
// ScriptedStream
// ---------------------------------------------------------------------------

/// A mock stream with scripted connect/subscribe results and a fixed queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted). Once the
/// message queue is drained the stream reports closed, unless
/// [`holding_open`](Self::holding_open) was set.
pub struct ScriptedStream {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    messages: VecDeque<Result<RawMessage>>,
    hold_open: bool,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            messages: VecDeque::new(),
            hold_open: false,
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_error(mut self, error: Error) -> Self {
        self.connect_results.push_back(Err(error));
        self
    }

    pub fn with_subscribe_error(mut self, error: Error) -> Self {
        self.subscribe_results.push_back(Err(error));
        self
    }

    pub fn with_message(mut self, message: RawMessage) -> Self {
        self.messages.push_back(Ok(message));
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = RawMessage>) -> Self {
        self.messages.extend(messages.into_iter().map(Ok));
        self
    }

    /// Queue a failed read.
    pub fn with_error(mut self, error: Error) -> Self {
        self.messages.push_back(Err(error));
        self
    }

    /// Block forever instead of closing once the queue is drained.
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Get shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStream for ScriptedStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, _topic: &str, _group: &str) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_message(&mut self) -> Option<Result<RawMessage>> {
        match self.messages.pop_front() {
            Some(next) => Some(next),
            None if self.hold_open => std::future::pending().await,
            None => None,
        }
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// ChannelStream
// ---------------------------------------------------------------------------

/// A mock stream controlled externally via a [`ChannelStreamHandle`].
///
/// Messages sent into the handle are read by the consumer via
/// `next_message()`. No real network I/O.
pub struct ChannelStream {
    message_rx: mpsc::Receiver<Option<RawMessage>>,
    subscribe_count: Arc<AtomicU32>,
    subscription: Arc<Mutex<Option<(String, String)>>>,
}

/// Control handle for a [`ChannelStream`].
pub struct ChannelStreamHandle {
    message_tx: mpsc::Sender<Option<RawMessage>>,
    subscribe_count: Arc<AtomicU32>,
    subscription: Arc<Mutex<Option<(String, String)>>>,
}

impl ChannelStreamHandle {
    /// Send a message to the stream.
    pub async fn send(&self, message: RawMessage) {
        let _ = self.message_tx.send(Some(message)).await;
    }

    /// Signal end-of-stream (causes `next_message` to return `None`).
    pub async fn close(&self) {
        let _ = self.message_tx.send(None).await;
    }

    /// How many times `subscribe()` was called.
    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }

    /// The `(topic, group)` of the last subscription.
    pub fn subscription(&self) -> Option<(String, String)> {
        self.subscription.lock().clone()
    }
}

/// Create a [`ChannelStream`] and its control [`ChannelStreamHandle`].
pub fn channel_stream(buffer: usize) -> (ChannelStream, ChannelStreamHandle) {
    let (tx, rx) = mpsc::channel(buffer);
    let sc = Arc::new(AtomicU32::new(0));
    let sub = Arc::new(Mutex::new(None));
    (
        ChannelStream {
            message_rx: rx,
            subscribe_count: sc.clone(),
            subscription: sub.clone(),
        },
        ChannelStreamHandle {
            message_tx: tx,
            subscribe_count: sc,
            subscription: sub,
        },
    )
}

#[async_trait]
impl MessageStream for ChannelStream {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str, group: &str) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        *self.subscription.lock() = Some((topic.to_string(), group.to_string()));
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<RawMessage>> {
        match self.message_rx.recv().await {
            Some(Some(message)) => Some(Ok(message)),
            Some(None) | None => None,
        }
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok, block_on};

    use super::*;

    #[test]
    fn scripted_stream_replays_script_then_closes() {
        let mut stream = ScriptedStream::new()
            .with_subscribe_error(Error::Subscription("denied".into()))
            .with_message(RawMessage::new("t", b"one".to_vec()))
            .with_error(Error::Connection("blip".into()));

        block_on(async {
            assert_ok!(stream.connect().await);
            assert_err!(stream.subscribe("t", "g").await);
            assert_ok!(stream.subscribe("t", "g").await);

            let first = stream.next_message().await.expect("scripted message");
            assert_eq!(assert_ok!(first).payload, b"one".to_vec());
            assert!(matches!(stream.next_message().await, Some(Err(_))));
            assert!(stream.next_message().await.is_none());
        });

        assert_eq!(stream.connect_count(), 1);
        assert_eq!(stream.subscribe_count(), 2);
    }

    #[test]
    fn channel_stream_records_subscription() {
        let (mut stream, handle) = channel_stream(4);

        block_on(async {
            assert_ok!(stream.subscribe("containers", "sync").await);
            handle.send(RawMessage::new("containers", b"{}".to_vec())).await;
            handle.close().await;

            assert!(matches!(stream.next_message().await, Some(Ok(_))));
            assert!(stream.next_message().await.is_none());
        });

        assert_eq!(
            handle.subscription(),
            Some(("containers".to_string(), "sync".to_string()))
        );
    }
}
