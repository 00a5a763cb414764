//! Notification filtering and record building.
//!
//! Notifications stay as raw JSON. The filter reads only the fields it
//! needs, in the order IronAPI's payloads make cheapest to reject: the
//! action first, then the embedded alert/event, then its category and
//! sub-category, and finally its severity. A field is only required once
//! the earlier checks have passed, so a notification with a disallowed
//! action is skipped even if the rest of it is incomplete.

use crate::error::ConnectorError;
use crate::ingest::{Artifact, Container};
use irondefense_common_config::{ActionFeedSettings, DomeFeedSettings};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The three IronAPI notification feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Alert,
    Dome,
    Event,
}

impl FeedKind {
    /// Poll order.
    pub const ALL: [FeedKind; 3] = [FeedKind::Alert, FeedKind::Dome, FeedKind::Event];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Alert => "/GetAlertNotifications",
            Self::Dome => "/GetDomeNotifications",
            Self::Event => "/GetEventNotifications",
        }
    }

    /// Key of the notification list in the response.
    pub fn list_key(&self) -> &'static str {
        match self {
            Self::Alert => "alert_notifications",
            Self::Dome => "dome_notifications",
            Self::Event => "event_notifications",
        }
    }

    /// Lower-case name used in log lines and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Dome => "dome",
            Self::Event => "event",
        }
    }

    fn action_key(&self) -> &'static str {
        match self {
            Self::Alert => "alert_action",
            Self::Dome => "category",
            Self::Event => "event_action",
        }
    }

    fn entity_key(&self) -> &'static str {
        match self {
            Self::Event => "event",
            _ => "alert",
        }
    }

    /// Upper-case word used in artifact names.
    fn artifact_suffix(&self) -> &'static str {
        match self {
            Self::Alert => "ALERT NOTIFICATION",
            Self::Dome => "DOME NOTIFICATION",
            Self::Event => "EVENT NOTIFICATION",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert => f.write_str("Alert"),
            Self::Dome => f.write_str("Dome"),
            Self::Event => f.write_str("Event"),
        }
    }
}

/// Why a notification was not ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ActionNotAllowed,
    MissingEntity,
    ExcludedCategory,
    ExcludedSubcategory,
    SeverityOutOfRange,
}

/// Filter verdict for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Ingest,
    Skip(SkipReason),
}

/// An artifact waiting for its container id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingArtifact {
    pub name: String,
    pub source_data_identifier: String,
    pub start_time: String,
    pub data: Value,
}

impl PendingArtifact {
    pub fn attach(self, container_id: u64) -> Artifact {
        Artifact {
            name: self.name,
            container_id,
            source_data_identifier: self.source_data_identifier,
            start_time: self.start_time,
            data: self.data,
        }
    }
}

/// A container and the artifact to file under it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPair {
    pub container: Container,
    pub artifact: PendingArtifact,
}

fn malformed(feed: FeedKind, message: impl Into<String>) -> ConnectorError {
    ConnectorError::Malformed {
        feed,
        message: message.into(),
    }
}

fn as_object(feed: FeedKind, value: &Value) -> Result<&Map<String, Value>, ConnectorError> {
    value
        .as_object()
        .ok_or_else(|| malformed(feed, "notification is not an object"))
}

fn str_field<'a>(
    feed: FeedKind,
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ConnectorError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(malformed(feed, format!("field '{key}' is not a string"))),
        None => Err(malformed(feed, format!("missing field '{key}'"))),
    }
}

/// Identifier that IronAPI may send as a number or a string.
fn id_field(feed: FeedKind, object: &Map<String, Value>, key: &str) -> Result<String, ConnectorError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(malformed(feed, format!("field '{key}' is not an identifier"))),
        None => Err(malformed(feed, format!("missing field '{key}'"))),
    }
}

/// Severity as an integer, accepting numeric strings.
fn severity_field(feed: FeedKind, object: &Map<String, Value>) -> Result<i64, ConnectorError> {
    let parsed = match object.get("severity") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
        None => return Err(malformed(feed, "missing field 'severity'")),
    };
    parsed.ok_or_else(|| malformed(feed, "field 'severity' is not an integer"))
}

/// The embedded alert/event, or `None` when it is absent, null or empty.
fn entity(feed: FeedKind, notification: &Map<String, Value>) -> Result<Option<&Map<String, Value>>, ConnectorError> {
    match notification.get(feed.entity_key()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(malformed(
            feed,
            format!("field '{}' is not an object", feed.entity_key()),
        )),
    }
}

/// Evaluate an alert or event notification against its feed settings.
pub fn evaluate(
    feed: FeedKind,
    settings: &ActionFeedSettings,
    notification: &Value,
) -> Result<Decision, ConnectorError> {
    let notification = as_object(feed, notification)?;

    let action = str_field(feed, notification, feed.action_key())?;
    if !settings.actions.iter().any(|allowed| allowed == action) {
        return Ok(Decision::Skip(SkipReason::ActionNotAllowed));
    }

    let Some(entity) = entity(feed, notification)? else {
        return Ok(Decision::Skip(SkipReason::MissingEntity));
    };

    let category = str_field(feed, entity, "category")?;
    if settings.excluded_categories.iter().any(|c| c == category) {
        return Ok(Decision::Skip(SkipReason::ExcludedCategory));
    }
    let sub_category = str_field(feed, entity, "sub_category")?;
    if settings.excluded_subcategories.iter().any(|c| c == sub_category) {
        return Ok(Decision::Skip(SkipReason::ExcludedSubcategory));
    }

    if !settings.severity.contains(severity_field(feed, entity)?) {
        return Ok(Decision::Skip(SkipReason::SeverityOutOfRange));
    }
    Ok(Decision::Ingest)
}

/// Evaluate a dome notification: only its category is filtered.
pub fn evaluate_dome(settings: &DomeFeedSettings, notification: &Value) -> Result<Decision, ConnectorError> {
    let notification = as_object(FeedKind::Dome, notification)?;
    let category = str_field(FeedKind::Dome, notification, "category")?;
    if settings.excluded_categories.iter().any(|c| c == category) {
        return Ok(Decision::Skip(SkipReason::ExcludedCategory));
    }
    Ok(Decision::Ingest)
}

/// `ANA_ALERT_CREATED` → `ALERT CREATED`.
fn display_name(prefixed: &str) -> String {
    prefixed.chars().skip(4).collect::<String>().replace('_', " ")
}

fn notification_artifact(
    feed: FeedKind,
    notification: &Value,
    action: &str,
    entity: &Map<String, Value>,
) -> Result<PendingArtifact, ConnectorError> {
    let id = id_field(feed, entity, "id")?;
    let updated = str_field(feed, entity, "updated")?;
    Ok(PendingArtifact {
        name: format!("{} {}", display_name(action), feed.artifact_suffix()),
        source_data_identifier: format!("{id}-{updated}"),
        start_time: updated.to_string(),
        data: notification.clone(),
    })
}

/// Fields shared by every alert/event record.
struct EntityFields<'a> {
    action: &'a str,
    entity: &'a Map<String, Value>,
    category: &'a str,
    sub_category: &'a str,
}

fn entity_fields(feed: FeedKind, notification: &Value) -> Result<EntityFields<'_>, ConnectorError> {
    let object = as_object(feed, notification)?;
    let action = str_field(feed, object, feed.action_key())?;
    let entity = entity(feed, object)?
        .ok_or_else(|| malformed(feed, format!("missing field '{}'", feed.entity_key())))?;
    Ok(EntityFields {
        action,
        entity,
        category: str_field(feed, entity, "category")?,
        sub_category: str_field(feed, entity, "sub_category")?,
    })
}

/// Container and artifact for an accepted alert notification.
pub fn alert_records(notification: &Value) -> Result<RecordPair, ConnectorError> {
    let feed = FeedKind::Alert;
    let fields = entity_fields(feed, notification)?;
    let (category, sub_category) = (fields.category, fields.sub_category);

    Ok(RecordPair {
        container: Container {
            name: format!("{category}/{sub_category}"),
            description: Some(format!("IronDefense {category}/{sub_category} alert")),
            kill_chain: Some(category.to_string()),
            source_data_identifier: id_field(feed, fields.entity, "id")?,
            data: Some(Value::Object(fields.entity.clone())),
        },
        artifact: notification_artifact(feed, notification, fields.action, fields.entity)?,
    })
}

/// Container and artifact for an accepted event notification.
///
/// With `in_alert_container` the artifact is filed under the container of
/// the event's alert instead of a container of its own.
pub fn event_records(notification: &Value, in_alert_container: bool) -> Result<RecordPair, ConnectorError> {
    let feed = FeedKind::Event;
    let fields = entity_fields(feed, notification)?;
    let (category, sub_category) = (fields.category, fields.sub_category);
    let name = format!("{category}/{sub_category}");

    let container = if in_alert_container {
        Container {
            name,
            description: None,
            kill_chain: None,
            source_data_identifier: id_field(feed, fields.entity, "alert_id")?,
            data: None,
        }
    } else {
        Container {
            name,
            description: Some(format!("IronDefense {category}/{sub_category} event")),
            kill_chain: Some(category.to_string()),
            source_data_identifier: id_field(feed, fields.entity, "id")?,
            data: Some(Value::Object(fields.entity.clone())),
        }
    };

    Ok(RecordPair {
        container,
        artifact: notification_artifact(feed, notification, fields.action, fields.entity)?,
    })
}

/// One container/artifact pair per alert a dome notification touches.
pub fn dome_records(notification: &Value) -> Result<Vec<RecordPair>, ConnectorError> {
    let feed = FeedKind::Dome;
    let object = as_object(feed, notification)?;
    let name = display_name(str_field(feed, object, "category")?);

    let alert_ids = match object.get("alert_ids") {
        Some(Value::Array(ids)) => ids,
        Some(_) => return Err(malformed(feed, "field 'alert_ids' is not a list")),
        None => return Err(malformed(feed, "missing field 'alert_ids'")),
    };
    if alert_ids.is_empty() {
        return Ok(Vec::new());
    }
    let id = id_field(feed, object, "id")?;
    let created = str_field(feed, object, "created")?;

    alert_ids
        .iter()
        .map(|alert_id| {
            let alert_id = match alert_id {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(malformed(feed, "entry in 'alert_ids' is not an identifier")),
            };
            Ok(RecordPair {
                container: Container {
                    name: name.clone(),
                    description: Some("Alert container with Dome notifications".to_string()),
                    kill_chain: None,
                    source_data_identifier: alert_id,
                    data: None,
                },
                artifact: PendingArtifact {
                    name: format!("{name} {}", feed.artifact_suffix()),
                    source_data_identifier: id.clone(),
                    start_time: created.to_string(),
                    data: notification.clone(),
                },
            })
        })
        .collect()
}
