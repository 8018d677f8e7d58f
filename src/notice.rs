//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `load_notice`.
//! Role: Shared contract for viewer diagnostics such as stale or rejected loads.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is additive-only once published.
use serde_json::{Map, Value, json};

use crate::api::{ApplyOutcome, LoadEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub file: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("file".to_string(), json!(notice.file));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Describe a load that did not end up on screen; `None` when it was displayed.
pub fn load_notice(event: &LoadEvent, cmd: &str, time: &str) -> Option<Notice> {
    let mut details = Map::new();
    details.insert("generation".to_string(), json!(event.generation.get()));
    let (kind, message) = match &event.outcome {
        ApplyOutcome::Displayed => return None,
        ApplyOutcome::Stale { displayed } => {
            details.insert("displayed_generation".to_string(), json!(displayed.get()));
            ("stale", "a newer selection is already displayed".to_string())
        }
        ApplyOutcome::Rejected(err) => {
            details.insert("error_kind".to_string(), json!(format!("{:?}", err.kind())));
            if let Some(category) = err.category() {
                details.insert("category".to_string(), json!(category.label()));
            }
            let message = err.message().unwrap_or("load failed").to_string();
            ("rejected", message)
        }
    };
    Some(Notice {
        kind: kind.to_string(),
        time: time.to_string(),
        cmd: cmd.to_string(),
        file: event.path.display().to_string(),
        message,
        details,
    })
}
