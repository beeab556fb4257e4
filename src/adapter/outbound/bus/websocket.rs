//! WebSocket transport for the message bus.
//!
//! # Connection Lifecycle
//!
//! 1. **Connect**: brokers are tried in configured order; the first that
//!    accepts the handshake is used
//! 2. **Subscribe**: a [`SubscribeFrame`] joins the consumer group
//! 3. **Read**: text frames are decoded as [`RecordFrame`]s, binary frames are
//!    taken as payloads on the subscribed topic, pings are answered
//!
//! Reconnection is not attempted here; a closed stream ends the process and
//! the supervisor restarts it.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use super::frame::{RecordFrame, SubscribeFrame};
use crate::error::{Error, Result};
use crate::port::outbound::stream::{MessageStream, RawMessage};

/// Message stream backed by a WebSocket connection to one of the brokers.
pub struct WebSocketBusStream {
    brokers: Vec<String>,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    topic: Option<String>,
}

impl WebSocketBusStream {
    /// Create a new stream for the given broker endpoints.
    #[must_use]
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            ws: None,
            topic: None,
        }
    }

    fn subscribed_topic(&self) -> String {
        self.topic.clone().unwrap_or_default()
    }
}

#[async_trait]
impl MessageStream for WebSocketBusStream {
    async fn connect(&mut self) -> Result<()> {
        let mut last_error = None;
        for broker in &self.brokers {
            info!(broker = %broker, "Connecting to message bus");
            match connect_async(broker.as_str()).await {
                Ok((ws_stream, response)) => {
                    info!(broker = %broker, status = %response.status(), "Message bus connected");
                    self.ws = Some(ws_stream);
                    return Ok(());
                }
                Err(e) => {
                    warn!(broker = %broker, error = %e, "Broker unreachable");
                    last_error = Some(e);
                }
            }
        }
        Err(match last_error {
            Some(e) => Error::from(e),
            None => Error::Connection("no brokers configured".into()),
        })
    }

    async fn subscribe(&mut self, topic: &str, group: &str) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;

        let json = serde_json::to_string(&SubscribeFrame::new(topic, group))?;
        info!(topic, group, "Subscribing to topic");
        ws.send(Message::Text(json))
            .await
            .map_err(|e| Error::Subscription(e.to_string()))?;

        self.topic = Some(topic.to_string());
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<RawMessage>> {
        loop {
            let ws = self.ws.as_mut()?;
            let frame = match ws.next().await {
                Some(frame) => frame,
                None => {
                    debug!("Message bus stream ended");
                    self.ws = None;
                    return None;
                }
            };

            match frame {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received bus text frame");
                    return Some(
                        serde_json::from_str::<RecordFrame>(&text)
                            .map(RawMessage::from)
                            .map_err(Error::from),
                    );
                }
                Ok(Message::Binary(data)) => {
                    trace!(bytes = data.len(), "Received bus binary frame");
                    return Some(Ok(RawMessage::new(self.subscribed_topic(), data)));
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received bus ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "Message bus closed by broker");
                    self.ws = None;
                    return None;
                }
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.ws = None;
                    return None;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    fn transport_name(&self) -> &'static str {
        "websocket"
    }
}
