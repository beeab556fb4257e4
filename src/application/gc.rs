//! Garbage collector for instance records.
//!
//! Runs beside the consumer loop on its own timer. Each pass deletes every
//! record whose last update is older than the age threshold, whatever its
//! phase. The store is the only state shared with the consumer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::port::outbound::store::InstanceStore;

/// Garbage collector timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcConfig {
    /// Time between passes. The first pass runs one interval after start.
    pub interval: Duration,
    /// Records not updated for this long are deleted.
    pub age_threshold: Duration,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(20 * 60),
            age_threshold: Duration::from_secs(4 * 60 * 60),
        }
    }
}

/// Handle for stopping a running collector.
pub struct GcHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl GcHandle {
    /// Signal the collector to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            error!(error = %e, "Garbage collector task failed");
        }
    }
}

/// Periodic pruning of stale instance records.
pub struct GarbageCollector<S> {
    store: Arc<S>,
    config: GcConfig,
}

impl<S: InstanceStore + 'static> GarbageCollector<S> {
    #[must_use]
    pub fn new(store: Arc<S>, config: GcConfig) -> Self {
        Self { store, config }
    }

    /// Run a single pass. Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the age threshold cannot be expressed as a
    /// cutoff time, or if the store fails.
    pub async fn run_once(&self) -> Result<usize> {
        let age = chrono::Duration::from_std(self.config.age_threshold)
            .map_err(|e| Error::Parse(format!("gc age threshold: {e}")))?;
        let cutoff = Utc::now()
            .checked_sub_signed(age)
            .ok_or_else(|| Error::Parse(format!("gc age threshold out of range: {age}")))?;
        debug!(cutoff = %cutoff, "Garbage collection pass");
        self.store.prune_stale(cutoff).await
    }

    /// Spawn the collector loop.
    ///
    /// A failed pass is logged and retried on the next tick.
    pub fn start(self) -> GcHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let period = self.config.interval;

        let task = tokio::spawn(async move {
            let Some(first_tick) = Instant::now().checked_add(period) else {
                error!(interval = ?period, "Garbage collector interval out of range, not started");
                return;
            };
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?period, age = ?self.config.age_threshold, "Garbage collector started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Garbage collector shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.run_once().await {
                            Ok(0) => debug!("Garbage collection found nothing stale"),
                            Ok(pruned) => info!(pruned, "Stale instance records removed"),
                            Err(e) => error!(error = %e, "Garbage collection failed"),
                        }
                    }
                }
            }
        });

        GcHandle { shutdown_tx, task }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::adapter::outbound::memory::MemoryInstanceStore;
    use crate::domain::{ContainerEvent, InstanceId, InstanceRecord};

    fn record(id: i64, container: &str, status: &str) -> InstanceRecord {
        let mut record = InstanceRecord::observe(&ContainerEvent::new(container, "t1", status));
        record.id = InstanceId::new(id);
        record
    }

    fn seeded_store() -> Arc<MemoryInstanceStore> {
        let store = Arc::new(MemoryInstanceStore::new());
        let now = Utc::now();
        store.insert_raw(record(1, "old-live", "Healthy"), now - ChronoDuration::hours(5));
        store.insert_raw(record(2, "old-dead", "Killed"), now - ChronoDuration::hours(6));
        store.insert_raw(record(3, "recent", "Healthy"), now - ChronoDuration::minutes(10));
        store
    }

    #[test]
    fn default_timing() {
        let config = GcConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1200));
        assert_eq!(config.age_threshold, Duration::from_secs(14400));
    }

    #[tokio::test]
    async fn run_once_removes_old_records_of_any_phase() {
        let store = seeded_store();
        let gc = GarbageCollector::new(Arc::clone(&store), GcConfig::default());

        assert_eq!(gc.run_once().await.unwrap(), 2);
        let remaining = store.records();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].container_id.as_str(), "recent");
    }

    #[tokio::test]
    async fn background_loop_prunes_after_first_interval() {
        let store = seeded_store();
        let config = GcConfig {
            interval: Duration::from_millis(20),
            age_threshold: Duration::from_secs(4 * 60 * 60),
        };
        let handle = GarbageCollector::new(Arc::clone(&store), config).start();

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await;

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn first_pass_waits_one_interval() {
        let store = seeded_store();
        let config = GcConfig {
            interval: Duration::from_secs(60),
            age_threshold: Duration::from_secs(60),
        };
        let handle = GarbageCollector::new(Arc::clone(&store), config).start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn run_once_with_unrepresentable_age_is_an_error() {
        let store = seeded_store();
        let config = GcConfig {
            interval: Duration::from_secs(60),
            age_threshold: Duration::from_secs(100_000_000_000_000),
        };
        let gc = GarbageCollector::new(Arc::clone(&store), config);

        assert!(matches!(gc.run_once().await, Err(Error::Parse(_))));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn oversized_interval_does_not_panic_the_task() {
        let store = seeded_store();
        let config = GcConfig {
            interval: Duration::from_secs(i64::MAX as u64),
            age_threshold: Duration::from_secs(60),
        };
        let handle = GarbageCollector::new(Arc::clone(&store), config).start();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let GcHandle { shutdown_tx, task } = handle;
        drop(shutdown_tx);
        assert!(task.await.is_ok());
        assert_eq!(store.len(), 3);
    }
}
