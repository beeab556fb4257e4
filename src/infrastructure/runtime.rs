//! Synchronizer runtime lifecycle.
//!
//! Two independent tasks share only the store: the consumer loop runs on
//! the caller's task and the garbage collector runs on a spawned one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::bootstrap::{build_consumer, build_gc, create_stream, init_store};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::InstanceStore;
use crate::port::outbound::stream::MessageStream;

/// Entry point for running the synchronizer.
pub struct Synchronizer;

impl Synchronizer {
    /// Run until the message stream fails or closes.
    pub async fn run(config: Config) -> Result<()> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        Self::run_with_shutdown(config, shutdown_rx).await
    }

    /// Run with an externally controlled shutdown signal.
    pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
        let store = Arc::new(init_store(&config)?);
        let stream = create_stream(&config);
        run_with(&config, stream, store, shutdown).await
    }
}

/// Run the consumer and garbage collector over the given stream and store.
pub async fn run_with<M, S>(
    config: &Config,
    stream: M,
    store: Arc<S>,
    shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    M: MessageStream,
    S: InstanceStore + 'static,
{
    info!(
        topic = %config.bus.topic,
        group = %config.bus.consumer_group,
        transport = stream.transport_name(),
        "Starting instance synchronizer"
    );

    let gc = build_gc(config, Arc::clone(&store)).start();
    let mut consumer = build_consumer(config, stream, store);
    let result = consumer.run(shutdown).await;

    gc.shutdown().await;
    info!(stats = ?consumer.stats(), "Instance synchronizer stopped");
    result
}
