//! Composition root: builds the store, stream and services from [`Config`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::bus::WebSocketBusStream;
use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, enable_wal, run_migrations,
};
use crate::adapter::outbound::sqlite::SqliteInstanceStore;
use crate::application::consumer::StreamConsumer;
use crate::application::decoder::EventDecoder;
use crate::application::gc::GarbageCollector;
use crate::application::reconciler::Reconciler;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::InstanceStore;
use crate::port::outbound::stream::MessageStream;

/// Open the database, apply migrations and wrap it in a store.
pub fn init_store(config: &Config) -> Result<SqliteInstanceStore> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    if config.database != ":memory:" {
        enable_wal(&pool)?;
    }
    info!(database = %config.database, "Database initialized");
    Ok(SqliteInstanceStore::new(pool))
}

/// Message stream over the configured brokers.
pub fn create_stream(config: &Config) -> WebSocketBusStream {
    WebSocketBusStream::new(config.bus.brokers.clone())
}

/// Consumer loop reading `stream` into `store`.
pub fn build_consumer<M, S>(config: &Config, stream: M, store: Arc<S>) -> StreamConsumer<M, S>
where
    M: MessageStream,
    S: InstanceStore,
{
    StreamConsumer::new(
        stream,
        EventDecoder::new(config.sync.freshness_window()),
        Reconciler::new(store),
        config.bus.topic.clone(),
        config.bus.consumer_group.clone(),
    )
}

/// Garbage collector over `store`.
pub fn build_gc<S: InstanceStore + 'static>(config: &Config, store: Arc<S>) -> GarbageCollector<S> {
    GarbageCollector::new(store, config.sync.gc())
}
