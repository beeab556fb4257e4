//! Synchronizer timing settings.

use std::time::Duration;

use serde::Deserialize;

use crate::application::gc::GcConfig;
use crate::error::ConfigError;

/// Freshness and garbage collection timing.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Batches older than this are discarded unapplied.
    #[serde(default = "default_freshness_window_secs")]
    pub message_freshness_window_secs: u64,
    /// Time between garbage collection passes.
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
    /// Records not updated for this long are garbage collected.
    #[serde(default = "default_gc_age_threshold_secs")]
    pub gc_age_threshold_secs: u64,
}

/// Upper bound for every duration: ten years.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_freshness_window_secs() -> u64 {
    180
}

fn default_gc_interval_secs() -> u64 {
    20 * 60
}

fn default_gc_age_threshold_secs() -> u64 {
    4 * 60 * 60
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_freshness_window_secs: default_freshness_window_secs(),
            gc_interval_secs: default_gc_interval_secs(),
            gc_age_threshold_secs: default_gc_age_threshold_secs(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn freshness_window(&self) -> chrono::Duration {
        i64::try_from(self.message_freshness_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    #[must_use]
    pub fn gc(&self) -> GcConfig {
        GcConfig {
            interval: Duration::from_secs(self.gc_interval_secs),
            age_threshold: Duration::from_secs(self.gc_age_threshold_secs),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("sync.message_freshness_window_secs", self.message_freshness_window_secs),
            ("sync.gc_interval_secs", self.gc_interval_secs),
            ("sync.gc_age_threshold_secs", self.gc_age_threshold_secs),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                });
            }
            if value > MAX_DURATION_SECS {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be at most {MAX_DURATION_SECS}"),
                });
            }
        }
        Ok(())
    }
}
