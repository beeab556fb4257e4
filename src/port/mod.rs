//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌──────────────────────────┐
//!   MessageStream │       Application        │ InstanceStore
//!  ──────────────►│ decoder → reconciler     ├──────────────►
//!                 │              ▲     gc ───┤
//!                 └──────────────┼───────────┘
//!                         CompetingSource
//! ```
//!
//! # Available Ports
//!
//! - [`MessageStream`] - Message-bus subscription delivering raw messages
//! - [`InstanceStore`] - Persistence and outbound query interface for records
//! - [`CompetingSource`] - Other ingestion paths that take precedence

pub mod outbound;

pub use outbound::source::CompetingSource;
pub use outbound::store::InstanceStore;
pub use outbound::stream::{MessageStream, RawMessage};
