//! Builders for bus payloads.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::application::decoder::{BATCH_KIND, SINGLE_CONTAINER_KIND};

/// A single-container message carrying `fields`.
pub fn single(fields: &Value) -> String {
    json!({
        "name": SINGLE_CONTAINER_KIND,
        "timestamp": Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        "fields": fields,
        "tags": {},
    })
    .to_string()
}

/// A batch message sent at `sent_at`, one entry per field set keyed by its `id`.
pub fn batch(sent_at: DateTime<Utc>, entries: &[Value]) -> String {
    let fields: Map<String, Value> = entries
        .iter()
        .map(|entry| {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (id, Value::String(entry.to_string()))
        })
        .collect();

    json!({
        "name": BATCH_KIND,
        "timestamp": sent_at.timestamp_nanos_opt().unwrap_or_default(),
        "fields": fields,
    })
    .to_string()
}

/// Minimal single-container message.
pub fn container(id: &str, task_id: &str, status: &str) -> String {
    single(&json!({"id": id, "task_id": task_id, "status": status}))
}
