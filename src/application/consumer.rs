//! Stream consumer loop.
//!
//! Pulls messages one at a time, decodes them and hands every event to the
//! [`Reconciler`]. Events are never processed concurrently with each other.
//!
//! ```text
//! Initializing --connect+subscribe--> Subscribed --first pull--> Running
//! ```
//!
//! Connect and subscribe failures are fatal. After that, nothing a single
//! message does can stop the loop: read errors, foreign topics, decode
//! failures, expired batches and store errors are logged and the loop moves
//! on. Only shutdown or the stream closing ends it.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use super::decoder::{DecodedMessage, EventDecoder};
use super::reconciler::{ReconcileOutcome, Reconciler};
use crate::domain::ContainerEvent;
use crate::error::{Error, Result};
use crate::port::outbound::store::InstanceStore;
use crate::port::outbound::stream::{MessageStream, RawMessage};

/// Consumer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Initializing,
    Subscribed,
    Running,
}

/// Counters for what the consumer has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub received: u64,
    pub read_errors: u64,
    pub foreign_topic: u64,
    pub rejected: u64,
    pub expired: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub duplicates_removed: u64,
    pub store_errors: u64,
}

/// Sequential consumer of one topic.
pub struct StreamConsumer<M, S> {
    stream: M,
    decoder: EventDecoder,
    reconciler: Reconciler<S>,
    topic: String,
    group: String,
    state: ConsumerState,
    stats: ConsumerStats,
}

impl<M: MessageStream, S: InstanceStore> StreamConsumer<M, S> {
    pub fn new(
        stream: M,
        decoder: EventDecoder,
        reconciler: Reconciler<S>,
        topic: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            stream,
            decoder,
            reconciler,
            topic: topic.into(),
            group: group.into(),
            state: ConsumerState::Initializing,
            stats: ConsumerStats::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    /// Connect, subscribe and consume until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting or subscribing fails, or if the stream
    /// closes while running.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.stream.connect().await.inspect_err(|e| {
            error!(transport = self.stream.transport_name(), error = %e, "Message bus connection failed");
        })?;
        self.stream
            .subscribe(&self.topic, &self.group)
            .await
            .inspect_err(|e| error!(topic = %self.topic, error = %e, "Subscription failed"))?;
        self.state = ConsumerState::Subscribed;
        info!(topic = %self.topic, group = %self.group, "Consumer subscribed");

        loop {
            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(stats = ?self.stats, "Consumer shutting down");
                        return Ok(());
                    }
                    continue;
                }
                next = self.stream.next_message() => next,
            };
            self.state = ConsumerState::Running;

            match next {
                Some(Ok(message)) => self.process(&message).await,
                Some(Err(e)) => {
                    self.stats.read_errors += 1;
                    warn!(error = %e, "Failed to read message, continuing");
                }
                None => {
                    warn!(stats = ?self.stats, "Message stream closed");
                    return Err(Error::Connection("message stream closed".into()));
                }
            }
        }
    }

    /// Decode and reconcile one message.
    pub async fn process(&mut self, message: &RawMessage) {
        self.stats.received += 1;

        if message.topic != self.topic {
            self.stats.foreign_topic += 1;
            warn!(topic = %message.topic, expected = %self.topic, "Message from unsubscribed topic dropped");
            return;
        }

        trace!(bytes = message.payload.len(), "Decoding message");
        let events = match self.decoder.decode(&message.payload, Utc::now()) {
            Ok(DecodedMessage::Single(event)) => vec![event],
            Ok(DecodedMessage::Batch(events)) => {
                debug!(count = events.len(), "Applying container batch");
                events
            }
            Ok(DecodedMessage::Expired { age }) => {
                self.stats.expired += 1;
                warn!(
                    age_secs = age.num_seconds(),
                    window_secs = self.decoder.freshness_window().num_seconds(),
                    "Discarding expired container batch"
                );
                return;
            }
            Err(e) => {
                self.stats.rejected += 1;
                warn!(error = %e, "Discarding undecodable message");
                return;
            }
        };

        self.apply(&events).await;
    }

    /// Reconcile events in order, abandoning the rest on the first store error.
    async fn apply(&mut self, events: &[ContainerEvent]) {
        for (index, event) in events.iter().enumerate() {
            match self.reconciler.reconcile(event).await {
                Ok(ReconcileOutcome::Created { .. }) => self.stats.created += 1,
                Ok(ReconcileOutcome::Updated { updated, removed }) => {
                    self.stats.updated += updated as u64;
                    self.stats.duplicates_removed += removed as u64;
                }
                Ok(ReconcileOutcome::Skipped { .. }) => self.stats.skipped += 1,
                Err(e) => {
                    self.stats.store_errors += 1;
                    error!(
                        container = %event.container_id,
                        task = %event.task_id,
                        abandoned = events.len() - index - 1,
                        error = %e,
                        "Reconciliation failed"
                    );
                    return;
                }
            }
        }
    }
}
