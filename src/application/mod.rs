//! Application services (use cases).
//!
//! These services drive domain logic through the outbound ports: the
//! consumer loop feeds decoded events to the reconciler, and the garbage
//! collector prunes the store on its own timer.

pub mod consumer;
pub mod decoder;
pub mod gc;
pub mod reconciler;
pub mod source;

pub use consumer::{ConsumerState, ConsumerStats, StreamConsumer};
pub use decoder::{DecodedMessage, EventDecoder};
pub use gc::{GarbageCollector, GcConfig, GcHandle};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use source::OrchestratorSource;
