//! Handler for the `run` command.

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime::Synchronizer;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();
    info!(
        config = %args.config.display(),
        database = %config.database,
        brokers = ?config.bus.brokers,
        "instance-sync starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    Synchronizer::run_with_shutdown(config, shutdown_rx).await?;
    info!("instance-sync stopped");
    Ok(())
}
