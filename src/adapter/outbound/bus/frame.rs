//! Bus wire frames.
//!
//! Example subscribe frame:
//! ```json
//! {"action":"subscribe","topic":"spot-metaserver_container","group":"instance-sync","offset_reset":"latest"}
//! ```
//!
//! Example record frame (payload is the event envelope, string-encoded):
//! ```json
//! {"topic":"spot-metaserver_container","payload":"{\"name\":\"metaserver_container\",...}"}
//! ```

use serde::{Deserialize, Serialize};

use crate::port::outbound::stream::RawMessage;

/// Subscription request sent to the broker.
#[derive(Debug, Serialize)]
pub struct SubscribeFrame<'a> {
    pub action: &'static str,
    pub topic: &'a str,
    pub group: &'a str,
    /// Where a new consumer group starts reading.
    pub offset_reset: &'static str,
}

impl<'a> SubscribeFrame<'a> {
    pub fn new(topic: &'a str, group: &'a str) -> Self {
        Self {
            action: "subscribe",
            topic,
            group,
            offset_reset: "latest",
        }
    }
}

/// One record delivered by the broker.
#[derive(Debug, Deserialize)]
pub struct RecordFrame {
    pub topic: String,
    pub payload: String,
}

impl From<RecordFrame> for RawMessage {
    fn from(frame: RecordFrame) -> Self {
        RawMessage::new(frame.topic, frame.payload.into_bytes())
    }
}
