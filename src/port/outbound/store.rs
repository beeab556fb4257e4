//! Persistence port for instance records.
//!
//! This is also the query interface served to collaborators that read
//! finished instance records.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{ContainerId, InstanceId, InstanceRecord, TaskId};
use crate::error::Result;

/// Storage operations for instance records.
///
/// Every call is a complete, independently atomic operation. Implementations
/// stamp a last-update time on each create/update; [`prune_stale`] compares
/// against it.
///
/// [`prune_stale`]: InstanceStore::prune_stale
pub trait InstanceStore: Send + Sync {
    /// All records owned by a task, ordered by ascending identity.
    fn find_by_task(&self, task_id: &TaskId)
        -> impl Future<Output = Result<Vec<InstanceRecord>>> + Send;

    /// Records for a container filed under an ingestion source's task namespace.
    fn find_by_container(
        &self,
        namespace: &TaskId,
        container_id: &ContainerId,
    ) -> impl Future<Output = Result<Vec<InstanceRecord>>> + Send;

    /// Get a record by identity.
    fn get(&self, id: InstanceId) -> impl Future<Output = Result<Option<InstanceRecord>>> + Send;

    /// Persist a new record and return it with its assigned identity.
    ///
    /// The record's own `id` is ignored.
    fn create(&self, record: &InstanceRecord)
        -> impl Future<Output = Result<InstanceRecord>> + Send;

    /// Overwrite an existing record. Returns false if it no longer exists.
    fn update(&self, record: &InstanceRecord) -> impl Future<Output = Result<bool>> + Send;

    /// Delete records by identity. Returns the number removed.
    fn delete(&self, ids: &[InstanceId]) -> impl Future<Output = Result<usize>> + Send;

    /// Delete every record last updated before `cutoff`. Returns count deleted.
    fn prune_stale(&self, cutoff: DateTime<Utc>) -> impl Future<Output = Result<usize>> + Send;
}
