//! SQLite persistence adapter.
//!
//! Provides the SQLite-backed [`InstanceStore`](crate::port::InstanceStore)
//! using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteInstanceStore;
