//! Reconciler: folds one decoded event into the persisted instance records.
//!
//! Per event:
//!
//! 1. Skip if a competing ingestion source owns the container or already
//!    tracks it under its namespace
//! 2. Look up the task's records; create one if there are none
//! 3. Otherwise resolve the phase and overwrite fields on each record
//! 4. Re-read the task's records and delete all but the lowest-identity
//!    record per container
//!
//! Every step is idempotent for identical input, so a redelivered event
//! leaves the store unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::source::OrchestratorSource;
use crate::domain::{ContainerEvent, InstanceId, InstanceRecord};
use crate::error::Result;
use crate::port::outbound::source::CompetingSource;
use crate::port::outbound::store::InstanceStore;

/// What a reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event belongs to another ingestion path.
    Skipped { source: &'static str },
    /// A new record was created.
    Created { id: InstanceId },
    /// Existing records were updated, and duplicates removed.
    Updated { updated: usize, removed: usize },
}

/// Applies decoded events to an [`InstanceStore`].
pub struct Reconciler<S> {
    store: Arc<S>,
    sources: Vec<Box<dyn CompetingSource>>,
}

impl<S: InstanceStore> Reconciler<S> {
    /// Create a reconciler that defers to the orchestrator path.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::without_sources(store).with_source(OrchestratorSource::new())
    }

    /// Create a reconciler with no competing sources.
    #[must_use]
    pub fn without_sources(store: Arc<S>) -> Self {
        Self {
            store,
            sources: Vec::new(),
        }
    }

    /// Register another competing ingestion source.
    #[must_use]
    pub fn with_source(mut self, source: impl CompetingSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reconcile one event against the store.
    ///
    /// # Errors
    ///
    /// Returns the first store error; later steps for this event are not run.
    pub async fn reconcile(&self, event: &ContainerEvent) -> Result<ReconcileOutcome> {
        if let Some(source) = self.competing_owner(event).await? {
            debug!(
                container = %event.container_id,
                task = %event.task_id,
                source,
                "Event tracked by another source, skipping"
            );
            return Ok(ReconcileOutcome::Skipped { source });
        }

        let existing = self.store.find_by_task(&event.task_id).await?;
        if existing.is_empty() {
            let created = self.store.create(&InstanceRecord::observe(event)).await?;
            info!(
                id = %created.id,
                container = %created.container_id,
                task = %created.task_id,
                phase = %created.phase,
                "Instance created"
            );
            return Ok(ReconcileOutcome::Created { id: created.id });
        }

        let mut updated = 0;
        for mut record in existing {
            let previous = record.phase;
            record.apply(event);
            if self.store.update(&record).await? {
                updated += 1;
                if previous != record.phase {
                    info!(
                        id = %record.id,
                        task = %record.task_id,
                        from = %previous,
                        to = %record.phase,
                        "Instance phase changed"
                    );
                }
            } else {
                debug!(id = %record.id, "Instance removed concurrently, update dropped");
            }
        }

        let removed = self.remove_duplicates(event).await?;
        Ok(ReconcileOutcome::Updated { updated, removed })
    }

    async fn competing_owner(&self, event: &ContainerEvent) -> Result<Option<&'static str>> {
        for source in &self.sources {
            if source.owns(event) {
                return Ok(Some(source.name()));
            }
            if event.container_id.is_unknown() {
                continue;
            }
            let tracked = self
                .store
                .find_by_container(source.namespace(), &event.container_id)
                .await?;
            if !tracked.is_empty() {
                return Ok(Some(source.name()));
            }
        }
        Ok(None)
    }

    /// Delete all but the lowest-identity record per container within a task.
    async fn remove_duplicates(&self, event: &ContainerEvent) -> Result<usize> {
        let records = self.store.find_by_task(&event.task_id).await?;
        let duplicates = duplicate_ids(&records);
        if duplicates.is_empty() {
            return Ok(0);
        }

        warn!(
            task = %event.task_id,
            count = duplicates.len(),
            "Removing duplicate instance records"
        );
        self.store.delete(&duplicates).await
    }
}

/// Identities of every record that repeats an earlier record's container.
///
/// Records without a container identity never count as duplicates.
fn duplicate_ids(records: &[InstanceRecord]) -> Vec<InstanceId> {
    let mut sorted: Vec<&InstanceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.id);

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|r| !r.container_id.is_unknown())
        .filter(|r| !seen.insert(&r.container_id))
        .map(|r| r.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::adapter::outbound::memory::MemoryInstanceStore;
    use crate::domain::{ContainerId, Phase, TaskId};

    fn reconciler() -> Reconciler<MemoryInstanceStore> {
        Reconciler::new(Arc::new(MemoryInstanceStore::new()))
    }

    fn raw(id: i64, container: &str, task: &str) -> InstanceRecord {
        let mut record = InstanceRecord::observe(&ContainerEvent::new(container, task, "Healthy"));
        record.id = InstanceId::new(id);
        record
    }

    #[tokio::test]
    async fn first_event_creates_record() {
        let reconciler = reconciler();
        let outcome = reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Starting"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Created { id: InstanceId::new(1) });
        let records = reconciler.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].phase, Phase::Running);
    }

    #[tokio::test]
    async fn later_event_updates_in_place() {
        let reconciler = reconciler();
        reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Starting"))
            .await
            .unwrap();

        let outcome = reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Healthy"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Updated { updated: 1, removed: 0 });
        assert_eq!(reconciler.store().records()[0].phase, Phase::Healthy);
    }

    #[tokio::test]
    async fn dead_record_stays_dead() {
        let reconciler = reconciler();
        let mut killed = ContainerEvent::new("c1", "t1", "Killed");
        killed.finished_at = Some(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap());
        reconciler.reconcile(&killed).await.unwrap();

        reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Healthy"))
            .await
            .unwrap();

        let record = &reconciler.store().records()[0];
        assert_eq!(record.phase, Phase::Dead);
        assert_eq!(record.finished_at, killed.finished_at);
    }

    #[tokio::test]
    async fn duplicates_collapse_to_lowest_identity() {
        let store = Arc::new(MemoryInstanceStore::new());
        store.insert_raw(raw(7, "c1", "t1"), Utc::now());
        store.insert_raw(raw(3, "c1", "t1"), Utc::now());
        store.insert_raw(raw(5, "c1", "t1"), Utc::now());
        let reconciler = Reconciler::new(Arc::clone(&store));

        let outcome = reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Healthy"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Updated { updated: 3, removed: 2 });
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, InstanceId::new(3));
    }

    #[tokio::test]
    async fn records_without_container_are_not_deduplicated() {
        let store = Arc::new(MemoryInstanceStore::new());
        store.insert_raw(raw(1, "", "t1"), Utc::now());
        store.insert_raw(raw(2, "", "t1"), Utc::now());
        store.insert_raw(raw(3, "c9", "t1"), Utc::now());
        let reconciler = Reconciler::new(Arc::clone(&store));

        reconciler
            .reconcile(&ContainerEvent::new("c9", "t1", "Healthy"))
            .await
            .unwrap();

        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn orchestrator_owned_event_is_skipped() {
        let reconciler = reconciler();
        let outcome = reconciler
            .reconcile(&ContainerEvent::new("pod-1", "pod-1", "Healthy"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Skipped { source: "orchestrator" });
        assert!(reconciler.store().is_empty());
    }

    #[tokio::test]
    async fn container_tracked_under_orchestrator_namespace_is_skipped() {
        let store = Arc::new(MemoryInstanceStore::new());
        store.insert_raw(raw(1, "c1", "K8S"), Utc::now());
        let reconciler = Reconciler::new(Arc::clone(&store));

        let outcome = reconciler
            .reconcile(&ContainerEvent::new("c1", "t1", "Healthy"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Skipped { source: "orchestrator" });
        assert_eq!(store.len(), 1);
        let kept = store
            .find_by_container(&TaskId::new("K8S"), &ContainerId::new("c1"))
            .await
            .unwrap();
        assert_eq!(kept[0].phase, Phase::Healthy);
    }

    #[tokio::test]
    async fn managed_group_member_with_self_task_is_reconciled() {
        let reconciler = reconciler();
        let event = ContainerEvent::new("pod-1", "pod-1", "Starting").with_managed_group("app-1");

        let outcome = reconciler.reconcile(&event).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Created { .. }));
        assert_eq!(reconciler.store().records()[0].phase, Phase::Healthy);
    }

    #[tokio::test]
    async fn without_sources_nothing_is_skipped() {
        let reconciler = Reconciler::without_sources(Arc::new(MemoryInstanceStore::new()));
        let outcome = reconciler
            .reconcile(&ContainerEvent::new("pod-1", "pod-1", "Healthy"))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Created { .. }));
    }

    #[test]
    fn duplicate_ids_ignores_input_order() {
        let records = vec![raw(9, "a", "t"), raw(2, "b", "t"), raw(4, "a", "t"), raw(6, "b", "t")];
        let mut ids = duplicate_ids(&records);
        ids.sort();
        assert_eq!(ids, vec![InstanceId::new(6), InstanceId::new(9)]);
    }
}
