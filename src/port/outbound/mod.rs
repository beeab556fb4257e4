//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the message bus, instance persistence, and the
//! competing ingestion paths the synchronizer defers to.

pub mod source;
pub mod store;
pub mod stream;
