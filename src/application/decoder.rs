//! Event decoder: raw bus payload to typed container events.
//!
//! Two message kinds share one envelope:
//!
//! ```json
//! {"name": "metaserver_container", "timestamp": 1760000000000000000,
//!  "fields": {"id": "c1", "task_id": "t1", "status": "Starting", ...}}
//!
//! {"name": "metaserver_all_containers", "timestamp": 1760000000000000000,
//!  "fields": {"c1": "{\"id\":\"c1\",...}", "c2": "{...}"}}
//! ```
//!
//! The batch kind is a periodic full resync. It is only honoured while fresh,
//! and it is decoded completely before anything is applied so a corrupt entry
//! never leaves a batch half-applied.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ContainerEvent, ServiceType};
use crate::error::DecodeError;

/// Message kind describing exactly one container.
pub const SINGLE_CONTAINER_KIND: &str = "metaserver_container";

/// Message kind carrying every running container, keyed by container ID.
pub const BATCH_KIND: &str = "metaserver_all_containers";

/// Zero time emitted by the runtime for "not finished".
const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

const ANNOTATION_KEYS: [&str; 5] = [
    "edas_app_id",
    "edas_app_name",
    "edas_group_id",
    "dice_component",
    "dice_shared_level",
];

#[derive(Debug, Deserialize)]
struct Envelope {
    name: String,
    /// Event time, nanoseconds since the epoch.
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Outcome of decoding one bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    Single(ContainerEvent),
    Batch(Vec<ContainerEvent>),
    /// A batch older than the freshness window; nothing in it may be applied.
    Expired { age: Duration },
}

/// Decodes envelopes into [`ContainerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    freshness_window: Duration,
}

impl EventDecoder {
    #[must_use]
    pub fn new(freshness_window: Duration) -> Self {
        Self { freshness_window }
    }

    #[must_use]
    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Decode one payload, judging batch freshness against `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the envelope is malformed, the kind is
    /// unknown, or any container field set fails to decode.
    pub fn decode(&self, payload: &[u8], now: DateTime<Utc>) -> Result<DecodedMessage, DecodeError> {
        let envelope: Envelope = serde_json::from_slice(payload).map_err(DecodeError::Envelope)?;

        match envelope.name.as_str() {
            SINGLE_CONTAINER_KIND => decode_fields(&envelope.fields).map(DecodedMessage::Single),
            BATCH_KIND => {
                let sent_at = Utc.timestamp_nanos(envelope.timestamp);
                let age = now - sent_at;
                if age > self.freshness_window {
                    return Ok(DecodedMessage::Expired { age });
                }
                decode_batch(&envelope.fields).map(DecodedMessage::Batch)
            }
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}

fn decode_batch(entries: &Map<String, Value>) -> Result<Vec<ContainerEvent>, DecodeError> {
    let mut events = Vec::with_capacity(entries.len());
    for (container_id, raw) in entries {
        let entry_error = |reason: String| DecodeError::BatchEntry {
            container_id: container_id.clone(),
            reason,
        };
        let Value::String(encoded) = raw else {
            return Err(entry_error("entry is not a JSON-encoded string".into()));
        };
        let fields: Map<String, Value> =
            serde_json::from_str(encoded).map_err(|e| entry_error(e.to_string()))?;
        events.push(decode_fields(&fields).map_err(|e| entry_error(e.to_string()))?);
    }
    Ok(events)
}

/// Typed accessors over an open key/value field set.
struct FieldSet<'a>(&'a Map<String, Value>);

impl<'a> FieldSet<'a> {
    fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn string(&self, key: &'static str) -> Result<Option<&'a str>, DecodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(DecodeError::InvalidField {
                field: key,
                reason: format!("expected string, got {other}"),
            }),
        }
    }

    fn required_string(&self, key: &'static str) -> Result<&'a str, DecodeError> {
        self.string(key)?
            .ok_or(DecodeError::MissingField { field: key })
    }

    fn owned(&self, key: &'static str) -> Result<Option<String>, DecodeError> {
        Ok(self.string(key)?.map(str::to_string))
    }

    fn number(&self, key: &'static str) -> Result<Option<f64>, DecodeError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(DecodeError::InvalidField {
                field: key,
                reason: format!("expected number, got {other}"),
            }),
        }
    }

    fn time(&self, key: &'static str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        let Some(raw) = self.string(key)? else {
            return Ok(None);
        };
        if raw.contains(ZERO_TIME) {
            return Ok(None);
        }
        match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                debug!(field = key, value = raw, error = %e, "Ignoring unparsable timestamp");
                Ok(None)
            }
        }
    }
}

/// Decode one container's field set.
fn decode_fields(fields: &Map<String, Value>) -> Result<ContainerEvent, DecodeError> {
    let fields = FieldSet(fields);

    let container_id = fields.required_string("id")?;
    let task_id = fields.required_string("task_id")?;
    let status = fields.required_string("status")?;

    let mut event = ContainerEvent::new(container_id, task_id, status);
    if let Some(group) = fields.string("edas_app_id")? {
        event = event.with_managed_group(group);
    }

    event.container_ip = fields.owned("ip")?.unwrap_or_default();
    event.cluster = fields.owned("cluster_name")?.unwrap_or_default();
    event.host_ip = fields.owned("host_ip")?.unwrap_or_default();
    event.image = fields.owned("image")?.unwrap_or_default();
    event.started_at = fields.time("started_at")?;
    event.finished_at = fields.time("finished_at")?;

    if let Some(cpu) = fields.number("cpu")? {
        event.cpu_limit = round_cents(cpu);
    }
    if let Some(memory) = fields.number("memory")? {
        event.mem_limit = (memory as i64) / 1024 / 1024;
    }
    if let Some(exit_code) = fields.number("exit_code")? {
        event.exit_code = exit_code as i32;
    }

    let class = &mut event.classification;
    class.org_id = fields.owned("dice_org")?;
    class.project_id = fields.owned("dice_project")?;
    class.project_name = fields.owned("dice_project_name")?;
    class.application_id = fields.owned("dice_application")?;
    class.application_name = fields.owned("dice_application_name")?;
    class.runtime_id = fields.owned("dice_runtime")?;
    class.runtime_name = fields.owned("dice_runtime_name")?;
    class.service_name = fields.owned("dice_service")?;
    class.workspace = fields.owned("dice_workspace")?;
    class.addon_id = fields.owned("dice_addon")?;
    class.service_type = if fields.has("pipeline_id") {
        ServiceType::Job
    } else if fields.has("dice_addon") || fields.has("dice_addon_name") {
        ServiceType::Addon
    } else {
        ServiceType::StatelessService
    };

    for key in ANNOTATION_KEYS {
        if let Some(value) = fields.string(key)? {
            event.annotations.insert(key, value);
        }
    }

    Ok(event)
}

/// Round to two decimals, nudging values that sit just below a boundary.
fn round_cents(value: f64) -> f64 {
    ((value + 1e-10) * 100.0).round() / 100.0
}
