//! Message-bus port.

use async_trait::async_trait;

use crate::error::Error;

/// A message as delivered by the bus, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Opaque payload; the event envelope for container topics.
    pub payload: Vec<u8>,
}

impl RawMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Subscription to a message-bus topic.
///
/// Implementations own connection management and framing for their
/// transport.
#[async_trait]
pub trait MessageStream: Send {
    /// Connect to the bus.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Join `group` and subscribe to `topic`.
    async fn subscribe(&mut self, topic: &str, group: &str) -> Result<(), Error>;

    /// Receive the next message.
    ///
    /// `Some(Err(_))` is a single failed read; the stream is still usable.
    /// Returns `None` once the stream is closed.
    async fn next_message(&mut self) -> Option<Result<RawMessage, Error>>;

    /// Get the transport name for logging/debugging.
    fn transport_name(&self) -> &'static str;
}

#[async_trait]
impl MessageStream for Box<dyn MessageStream> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, topic: &str, group: &str) -> Result<(), Error> {
        (**self).subscribe(topic, group).await
    }

    async fn next_message(&mut self) -> Option<Result<RawMessage, Error>> {
        (**self).next_message().await
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}
