//! Notification payloads shaped like IronAPI feed items.

use serde_json::{json, Value};

/// An alert as embedded in alert notifications.
pub fn alert(id: &str, category: &str, sub_category: &str, severity: i64) -> Value {
    json!({
        "id": id,
        "category": category,
        "sub_category": sub_category,
        "severity": severity,
        "status": "STATUS_AWAITING_REVIEW",
        "created": "2024-03-01T10:00:00Z",
        "updated": "2024-03-01T10:05:00Z",
    })
}

/// An alert notification wrapping [`alert`].
pub fn alert_notification(action: &str, alert_value: Value) -> Value {
    json!({
        "alert_action": action,
        "alert": alert_value,
    })
}

/// An event as embedded in event notifications.
pub fn event(id: &str, alert_id: &str, category: &str, sub_category: &str, severity: i64) -> Value {
    json!({
        "id": id,
        "alert_id": alert_id,
        "category": category,
        "sub_category": sub_category,
        "severity": severity,
        "created": "2024-03-01T09:58:00Z",
        "updated": "2024-03-01T10:01:00Z",
    })
}

/// An event notification wrapping [`event`].
pub fn event_notification(action: &str, event_value: Value) -> Value {
    json!({
        "event_action": action,
        "event": event_value,
    })
}

/// A dome notification touching `alert_ids`.
pub fn dome_notification(id: u64, category: &str, alert_ids: &[&str]) -> Value {
    json!({
        "id": id,
        "category": category,
        "alert_ids": alert_ids,
        "created": "2024-03-01T11:00:00Z",
        "dome_tags": [],
    })
}
