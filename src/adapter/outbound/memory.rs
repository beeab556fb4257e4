//! In-memory instance store.
//!
//! Used by tests and for running the synchronizer without a database file.
//! A single lock guards the map, so every operation is atomic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{ContainerId, InstanceId, InstanceRecord, TaskId};
use crate::error::Result;
use crate::port::outbound::store::InstanceStore;

#[derive(Debug)]
struct Entry {
    record: InstanceRecord,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    entries: BTreeMap<InstanceId, Entry>,
}

/// In-memory store for testing purposes.
#[derive(Debug, Default)]
pub struct MemoryInstanceStore {
    inner: RwLock<Inner>,
}

impl MemoryInstanceStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record, ordered by identity.
    #[must_use]
    pub fn records(&self) -> Vec<InstanceRecord> {
        self.inner
            .read()
            .entries
            .values()
            .map(|e| e.record.clone())
            .collect()
    }

    /// Insert a record under an explicit identity, bypassing id allocation.
    ///
    /// Lets tests recreate the duplicate rows a concurrent writer leaves
    /// behind.
    pub fn insert_raw(&self, record: InstanceRecord, updated_at: DateTime<Utc>) {
        let mut inner = self.inner.write();
        inner.next_id = inner.next_id.max(record.id.get());
        inner.entries.insert(record.id, Entry { record, updated_at });
    }

    fn select(&self, predicate: impl Fn(&InstanceRecord) -> bool) -> Vec<InstanceRecord> {
        self.inner
            .read()
            .entries
            .values()
            .filter(|e| predicate(&e.record))
            .map(|e| e.record.clone())
            .collect()
    }
}

impl InstanceStore for MemoryInstanceStore {
    async fn find_by_task(&self, task_id: &TaskId) -> Result<Vec<InstanceRecord>> {
        Ok(self.select(|r| &r.task_id == task_id))
    }

    async fn find_by_container(
        &self,
        namespace: &TaskId,
        container_id: &ContainerId,
    ) -> Result<Vec<InstanceRecord>> {
        Ok(self.select(|r| &r.task_id == namespace && &r.container_id == container_id))
    }

    async fn get(&self, id: InstanceId) -> Result<Option<InstanceRecord>> {
        Ok(self.inner.read().entries.get(&id).map(|e| e.record.clone()))
    }

    async fn create(&self, record: &InstanceRecord) -> Result<InstanceRecord> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let mut created = record.clone();
        created.id = InstanceId::new(inner.next_id);
        inner.entries.insert(
            created.id,
            Entry {
                record: created.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(created)
    }

    async fn update(&self, record: &InstanceRecord) -> Result<bool> {
        let mut inner = self.inner.write();
        match inner.entries.get_mut(&record.id) {
            Some(entry) => {
                entry.record = record.clone();
                entry.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, ids: &[InstanceId]) -> Result<usize> {
        let mut inner = self.inner.write();
        Ok(ids
            .iter()
            .filter(|id| inner.entries.remove(*id).is_some())
            .count())
    }

    async fn prune_stale(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.updated_at >= cutoff);
        Ok(before - inner.entries.len())
    }
}
