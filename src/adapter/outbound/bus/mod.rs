//! Message-bus adapter.
//!
//! The broker is reached over WebSocket: a subscribe frame names the topic and
//! consumer group, then each text frame carries one bus record.

pub mod frame;
pub mod websocket;

pub use websocket::WebSocketBusStream;
