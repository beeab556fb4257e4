//! Competing ingestion sources.
//!
//! Several independent pipelines may report the same container runtime.
//! A [`CompetingSource`] is one that takes precedence over this synchronizer:
//! if it owns a container, the reconciler neither creates nor mutates a record
//! for it.

use crate::domain::{ContainerEvent, TaskId};

/// An ingestion path whose records win over ours.
pub trait CompetingSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Task namespace under which this source files its records.
    fn namespace(&self) -> &TaskId;

    /// Whether this source owns the reported container outright, judged from
    /// the report alone.
    fn owns(&self, event: &ContainerEvent) -> bool;
}
