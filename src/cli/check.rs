//! Configuration validation command.

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file without starting the synchronizer.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;

    println!("✓ Configuration file is valid");
    println!();
    println!("Summary:");
    println!("  Database: {}", config.database);
    println!("  Brokers: {}", config.bus.brokers.join(", "));
    println!("  Topic: {}", config.bus.topic);
    println!("  Consumer group: {}", config.bus.consumer_group);
    println!(
        "  Batch freshness window: {}s",
        config.sync.message_freshness_window_secs
    );
    println!(
        "  GC: every {}s, removing records idle for {}s",
        config.sync.gc_interval_secs, config.sync.gc_age_threshold_secs
    );
    println!("  Logging: {} ({})", config.logging.level, config.logging.format);
    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
