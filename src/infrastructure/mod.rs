//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic: configuration, wiring and runtime lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`runtime`] - Consumer and garbage collector lifecycle

pub mod bootstrap;
pub mod config;
pub mod runtime;
