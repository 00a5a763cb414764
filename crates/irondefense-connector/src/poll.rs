//! Notification polling.
//!
//! Each feed makes one `{"limit": n}` request, filters what comes back and
//! hands accepted notifications to the sink. Feeds are independent: one
//! failing does not stop the next.

use crate::client::IronApiClient;
use crate::error::ConnectorError;
use crate::filter::{self, Decision, FeedKind, RecordPair};
use crate::ingest::{IngestSink, RecordKind};
use crate::params::LimitRequest;
use irondefense_common_config::{ActionFeedSettings, ConnectorSettings, DomeFeedSettings, EventFeedSettings};
use irondefense_common_log::spans::feed_span;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn, Instrument};

/// Counters for one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedSummary {
    pub feed: FeedKind,
    /// Notifications returned by IronAPI.
    pub fetched: usize,
    /// Notifications that passed the filter.
    pub ingested: usize,
    pub skipped: usize,
    pub containers_created: usize,
    pub artifacts_created: usize,
}

impl FeedSummary {
    fn new(feed: FeedKind, fetched: usize) -> Self {
        Self {
            feed,
            fetched,
            ingested: 0,
            skipped: 0,
            containers_created: 0,
            artifacts_created: 0,
        }
    }
}

/// A feed that failed, with the message shown to the analyst.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedFailure {
    pub feed: FeedKind,
    pub message: String,
}

/// Result of polling every feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub completed: Vec<FeedSummary>,
    pub failed: Vec<FeedFailure>,
    pub disabled: Vec<FeedKind>,
}

impl PollSummary {
    /// True when every enabled feed succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Failure messages, one per failed feed.
    pub fn failure_message(&self) -> String {
        self.failed
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

async fn fetch(client: &IronApiClient, feed: FeedKind, limit: u32) -> Result<Vec<Value>, ConnectorError> {
    let response = match client.post(feed.endpoint(), &LimitRequest { limit }).await {
        Ok(response) => response,
        Err(e) => {
            info!("Fetching {} notifications failed", feed.as_str());
            return Err(e);
        }
    };

    let notifications = match response.get(feed.list_key()) {
        Some(Value::Array(items)) => items.clone(),
        _ => {
            return Err(ConnectorError::UnexpectedPayload(format!(
                "missing '{}' list",
                feed.list_key()
            )))
        }
    };
    info!(
        "Fetching {} notifications was successful, got {} notifications",
        feed.as_str(),
        notifications.len()
    );
    Ok(notifications)
}

fn store(
    feed: FeedKind,
    pair: RecordPair,
    sink: &mut dyn IngestSink,
    summary: &mut FeedSummary,
) -> Result<(), ConnectorError> {
    let container = sink
        .save_container(&pair.container)
        .map_err(|source| ConnectorError::Ingest {
            feed,
            record: RecordKind::Container,
            source,
        })?;
    if container.created {
        summary.containers_created += 1;
    }

    let artifact = pair.artifact.attach(container.id);
    let saved = sink
        .save_artifact(&artifact)
        .map_err(|source| ConnectorError::Ingest {
            feed,
            record: RecordKind::Artifact,
            source,
        })?;
    if saved.created {
        summary.artifacts_created += 1;
    }
    debug!(
        container_id = container.id,
        artifact_id = saved.id,
        name = %artifact.name,
        "Stored notification"
    );
    Ok(())
}

/// Poll the alert feed.
pub async fn poll_alerts(
    client: &IronApiClient,
    settings: &ActionFeedSettings,
    sink: &mut dyn IngestSink,
) -> Result<FeedSummary, ConnectorError> {
    let feed = FeedKind::Alert;
    async {
        let notifications = fetch(client, feed, settings.limit).await?;
        let mut summary = FeedSummary::new(feed, notifications.len());

        for notification in &notifications {
            match filter::evaluate(feed, settings, notification)? {
                Decision::Ingest => {
                    store(feed, filter::alert_records(notification)?, sink, &mut summary)?;
                    summary.ingested += 1;
                }
                Decision::Skip(reason) => {
                    debug!(?reason, "Skipping alert notification");
                    summary.skipped += 1;
                }
            }
        }

        info!("Filtering alert notifications was successful");
        Ok::<_, ConnectorError>(summary)
    }
    .instrument(feed_span(feed.as_str(), settings.limit))
    .await
}

/// Poll the dome feed.
pub async fn poll_dome(
    client: &IronApiClient,
    settings: &DomeFeedSettings,
    sink: &mut dyn IngestSink,
) -> Result<FeedSummary, ConnectorError> {
    let feed = FeedKind::Dome;
    async {
        let notifications = fetch(client, feed, settings.limit).await?;
        let mut summary = FeedSummary::new(feed, notifications.len());

        for notification in &notifications {
            match filter::evaluate_dome(settings, notification)? {
                Decision::Ingest => {
                    for pair in filter::dome_records(notification)? {
                        store(feed, pair, sink, &mut summary)?;
                    }
                    summary.ingested += 1;
                }
                Decision::Skip(reason) => {
                    debug!(?reason, "Skipping dome notification");
                    summary.skipped += 1;
                }
            }
        }

        info!("Filtering dome notifications was successful");
        Ok::<_, ConnectorError>(summary)
    }
    .instrument(feed_span(feed.as_str(), settings.limit))
    .await
}

/// Poll the event feed.
pub async fn poll_events(
    client: &IronApiClient,
    settings: &EventFeedSettings,
    sink: &mut dyn IngestSink,
) -> Result<FeedSummary, ConnectorError> {
    let feed = FeedKind::Event;
    async {
        let notifications = fetch(client, feed, settings.filter.limit).await?;
        let mut summary = FeedSummary::new(feed, notifications.len());

        for notification in &notifications {
            match filter::evaluate(feed, &settings.filter, notification)? {
                Decision::Ingest => {
                    let pair = filter::event_records(notification, settings.store_in_alert_containers)?;
                    store(feed, pair, sink, &mut summary)?;
                    summary.ingested += 1;
                }
                Decision::Skip(reason) => {
                    debug!(?reason, "Skipping event notification");
                    summary.skipped += 1;
                }
            }
        }

        info!("Filtering event notifications was successful");
        Ok::<_, ConnectorError>(summary)
    }
    .instrument(feed_span(feed.as_str(), settings.filter.limit))
    .await
}

/// Poll one feed. Fails with [`ConnectorError::FeedDisabled`] when the
/// feed is not enabled.
pub async fn poll_feed(
    client: &IronApiClient,
    settings: &ConnectorSettings,
    feed: FeedKind,
    sink: &mut dyn IngestSink,
) -> Result<FeedSummary, ConnectorError> {
    match feed {
        FeedKind::Alert => match &settings.alert {
            Some(alert) => poll_alerts(client, alert, sink).await,
            None => Err(ConnectorError::FeedDisabled { feed }),
        },
        FeedKind::Dome => match &settings.dome {
            Some(dome) => poll_dome(client, dome, sink).await,
            None => Err(ConnectorError::FeedDisabled { feed }),
        },
        FeedKind::Event => match &settings.event {
            Some(event) => poll_events(client, event, sink).await,
            None => Err(ConnectorError::FeedDisabled { feed }),
        },
    }
}

/// Poll every enabled feed in order alert, dome, event.
pub async fn poll_all(
    client: &IronApiClient,
    settings: &ConnectorSettings,
    sink: &mut dyn IngestSink,
) -> PollSummary {
    let mut summary = PollSummary::default();

    for feed in FeedKind::ALL {
        match poll_feed(client, settings, feed, sink).await {
            Ok(done) => summary.completed.push(done),
            Err(ConnectorError::FeedDisabled { feed }) => {
                info!("Fetching {} notifications is disabled", feed.as_str());
                summary.disabled.push(feed);
            }
            Err(e) => {
                warn!(feed = feed.as_str(), error = %e, "Feed failed");
                summary.failed.push(FeedFailure {
                    feed,
                    message: e.to_string(),
                });
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_joins_feeds() {
        let summary = PollSummary {
            completed: vec![],
            failed: vec![
                FeedFailure {
                    feed: FeedKind::Alert,
                    message: "Empty response and no information in the header".to_string(),
                },
                FeedFailure {
                    feed: FeedKind::Event,
                    message: "Event Notification artifact creation failed: full".to_string(),
                },
            ],
            disabled: vec![FeedKind::Dome],
        };
        assert!(!summary.is_success());
        assert_eq!(
            summary.failure_message(),
            "Empty response and no information in the header; Event Notification artifact creation failed: full"
        );
    }

    #[test]
    fn test_empty_summary_is_success() {
        assert!(PollSummary::default().is_success());
    }
}
