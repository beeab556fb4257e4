//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`] - Mock [`MessageStream`](crate::port::outbound::stream::MessageStream)
//!   implementations: `ScriptedStream`, `ChannelStream`.
//! - [`envelope`] - Builders for bus payloads in both message kinds.
//! - [`store`] - A store wrapper that fails on demand.

pub mod envelope;
pub mod store;
pub mod stream;
