//! Source-agnostic domain types for tracked container instances.
//!
//! Nothing in here performs I/O. The reconciler composes these types with
//! the store and stream ports defined in [`crate::port`].

pub mod annotations;
pub mod event;
pub mod id;
pub mod instance;
pub mod phase;

pub use annotations::Annotations;
pub use event::{Classification, ContainerEvent, ServiceType};
pub use id::{ContainerId, InstanceId, TaskId};
pub use instance::InstanceRecord;
pub use phase::Phase;
