//! A store wrapper that fails on demand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adapter::outbound::memory::MemoryInstanceStore;
use crate::domain::{ContainerId, InstanceId, InstanceRecord, TaskId};
use crate::error::{Error, Result};
use crate::port::outbound::store::InstanceStore;

/// Wraps a [`MemoryInstanceStore`] and fails every write after a fixed number succeed.
///
/// Reads always succeed so tests can inspect what made it through.
pub struct FailingStore {
    inner: Arc<MemoryInstanceStore>,
    writes_left: AtomicUsize,
}

impl FailingStore {
    /// Allow `writes` successful writes, then fail.
    pub fn new(inner: Arc<MemoryInstanceStore>, writes: usize) -> Self {
        Self {
            inner,
            writes_left: AtomicUsize::new(writes),
        }
    }

    pub fn inner(&self) -> &Arc<MemoryInstanceStore> {
        &self.inner
    }

    fn take_write(&self) -> Result<()> {
        self.writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| Error::Database("injected write failure".into()))
    }
}

impl InstanceStore for FailingStore {
    async fn find_by_task(&self, task_id: &TaskId) -> Result<Vec<InstanceRecord>> {
        self.inner.find_by_task(task_id).await
    }

    async fn find_by_container(
        &self,
        namespace: &TaskId,
        container_id: &ContainerId,
    ) -> Result<Vec<InstanceRecord>> {
        self.inner.find_by_container(namespace, container_id).await
    }

    async fn get(&self, id: InstanceId) -> Result<Option<InstanceRecord>> {
        self.inner.get(id).await
    }

    async fn create(&self, record: &InstanceRecord) -> Result<InstanceRecord> {
        self.take_write()?;
        self.inner.create(record).await
    }

    async fn update(&self, record: &InstanceRecord) -> Result<bool> {
        self.take_write()?;
        self.inner.update(record).await
    }

    async fn delete(&self, ids: &[InstanceId]) -> Result<usize> {
        self.take_write()?;
        self.inner.delete(ids).await
    }

    async fn prune_stale(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.take_write()?;
        self.inner.prune_stale(cutoff).await
    }
}
