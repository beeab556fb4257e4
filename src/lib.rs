//! instance-sync - Container lifecycle to instance record synchronizer.
//!
//! Consumes container lifecycle events from a message bus topic and keeps
//! one persisted instance record per task up to date, resolving each
//! record's phase through a fixed state machine. Duplicate, out-of-order
//! and stale events converge on the same record.
//!
//! # Architecture
//!
//! ```text
//! MessageStream --> StreamConsumer --> EventDecoder
//!                         |
//!                         v
//!                    Reconciler --(Phase::resolve)--> InstanceStore
//!                                                          ^
//!                    GarbageCollector --(timer)------------+
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Instance records, container events, phases and identities
//! - [`port`] - Outbound traits: store, message stream, competing sources
//! - [`adapter`] - SQLite and in-memory stores, WebSocket bus transport
//! - [`application`] - Decoder, reconciler, consumer loop, garbage collector
//! - [`infrastructure`] - Configuration, wiring and runtime lifecycle
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use instance_sync::infrastructure::config::settings::Config;
//! use instance_sync::infrastructure::runtime::Synchronizer;
//!
//! # async fn example() -> instance_sync::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! Synchronizer::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
