//! Message bus connection settings.

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Where to consume container events from.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BusConfig {
    /// Broker endpoints, tried in order.
    #[serde(default)]
    pub brokers: Vec<String>,
    /// Consumer group shared by every synchronizer replica.
    #[serde(default)]
    pub consumer_group: String,
    /// Topic carrying container events.
    #[serde(default)]
    pub topic: String,
}

impl BusConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.brokers.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bus.brokers",
            });
        }
        for broker in &self.brokers {
            let url = Url::parse(broker).map_err(|e| ConfigError::InvalidValue {
                field: "bus.brokers",
                reason: format!("{broker}: {e}"),
            })?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(ConfigError::InvalidValue {
                    field: "bus.brokers",
                    reason: format!("{broker}: scheme must be ws or wss"),
                });
            }
        }
        if self.consumer_group.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "bus.consumer_group",
            });
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "bus.topic" });
        }
        Ok(())
    }
}
