//! Outbound adapters (driven side).

pub mod bus;
pub mod memory;
pub mod sqlite;
