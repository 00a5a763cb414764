//! Normalised connector settings.
//!
//! [`ConnectorSettings::from_asset`] turns the operator-facing
//! [`AssetConfig`] into the exact strings IronAPI uses: action names such
//! as `alert created` become `ANA_ALERT_CREATED`, dome categories gain the
//! `DNC_` prefix, and so on. Feed settings exist only for enabled feeds.

use crate::types::{AssetConfig, CommaList};
use irondefense_common_secret::SecretString;
use thiserror::Error;

/// Prefix IronAPI puts on alert notification actions.
pub const ALERT_ACTION_PREFIX: &str = "ANA_";
/// Prefix IronAPI puts on event notification actions.
pub const EVENT_ACTION_PREFIX: &str = "ENA_";
/// Prefix IronAPI puts on dome notification categories.
pub const DOME_CATEGORY_PREFIX: &str = "DNC_";
/// Alert actions ingested when none are configured.
pub const DEFAULT_ALERT_ACTION: &str = "ANA_ALERT_CREATED";
/// Event actions ingested when none are configured.
pub const DEFAULT_EVENT_ACTION: &str = "ENA_EVENT_CREATED";

/// Settings errors raised while initialising the connector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Initialization Failed: Invalid Range for {feed} Severity- {lower} is not lower than {upper}")]
    InvalidSeverityRange {
        feed: &'static str,
        lower: i64,
        upper: i64,
    },

    #[error("Initialization Failed: {feed} notification limit must be greater than 0")]
    InvalidLimit { feed: &'static str },
}

/// Upper-case a user token and replace spaces with underscores.
///
/// `" alert created "` → `"ALERT_CREATED"`.
pub fn normalize_token(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_uppercase()
}

/// Normalise every non-blank entry and prepend `prefix`.
pub fn normalize_list(list: &CommaList, prefix: &str) -> Vec<String> {
    list.entries()
        .iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| format!("{prefix}{}", normalize_token(entry)))
        .collect()
}

/// Inclusive severity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityRange {
    pub lower: i64,
    pub upper: i64,
}

impl SeverityRange {
    /// Build a range; `lower` must be strictly below `upper`.
    pub fn new(feed: &'static str, lower: i64, upper: i64) -> Result<Self, SettingsError> {
        if lower >= upper {
            return Err(SettingsError::InvalidSeverityRange { feed, lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Inclusive membership.
    pub fn contains(&self, severity: i64) -> bool {
        self.lower <= severity && severity <= self.upper
    }
}

/// Filter settings shared by the alert and event feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFeedSettings {
    /// Allowed notification actions, prefixed (`ANA_…` / `ENA_…`).
    pub actions: Vec<String>,
    /// Excluded categories.
    pub excluded_categories: Vec<String>,
    /// Excluded sub-categories.
    pub excluded_subcategories: Vec<String>,
    /// Accepted severities.
    pub severity: SeverityRange,
    /// Notifications requested per poll.
    pub limit: u32,
}

/// Dome feed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomeFeedSettings {
    /// Excluded categories, prefixed `DNC_`.
    pub excluded_categories: Vec<String>,
    /// Notifications requested per poll.
    pub limit: u32,
}

/// Event feed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFeedSettings {
    pub filter: ActionFeedSettings,
    /// Attach event notifications to their alert's container.
    pub store_in_alert_containers: bool,
}

/// Everything the connector needs, normalised.
#[derive(Debug, Clone)]
pub struct ConnectorSettings {
    /// Host URL without the `/IronApi` suffix.
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    pub verify_server_cert: bool,
    /// Present when alert notifications are enabled.
    pub alert: Option<ActionFeedSettings>,
    /// Present when dome notifications are enabled.
    pub dome: Option<DomeFeedSettings>,
    /// Present when event notifications are enabled.
    pub event: Option<EventFeedSettings>,
}

fn positive_limit(feed: &'static str, limit: u32) -> Result<u32, SettingsError> {
    if limit == 0 {
        return Err(SettingsError::InvalidLimit { feed });
    }
    Ok(limit)
}

fn actions_or_default(list: &CommaList, prefix: &str, default: &str) -> Vec<String> {
    let actions = normalize_list(list, prefix);
    if actions.is_empty() {
        vec![default.to_string()]
    } else {
        actions
    }
}

impl ConnectorSettings {
    /// Normalise an asset configuration.
    pub fn from_asset(asset: &AssetConfig) -> Result<Self, SettingsError> {
        let alert = if asset.enable_alert_notifications {
            Some(ActionFeedSettings {
                actions: actions_or_default(
                    &asset.alert_notification_actions,
                    ALERT_ACTION_PREFIX,
                    DEFAULT_ALERT_ACTION,
                ),
                excluded_categories: normalize_list(&asset.alert_categories, ""),
                excluded_subcategories: normalize_list(&asset.alert_subcategories, ""),
                severity: SeverityRange::new(
                    "Alert",
                    asset.alert_severity_lower,
                    asset.alert_severity_upper,
                )?,
                limit: positive_limit("Alert", asset.alert_limit)?,
            })
        } else {
            None
        };

        let dome = if asset.enable_dome_notifications {
            Some(DomeFeedSettings {
                excluded_categories: normalize_list(&asset.dome_categories, DOME_CATEGORY_PREFIX),
                limit: positive_limit("Dome", asset.dome_limit)?,
            })
        } else {
            None
        };

        let event = if asset.enable_event_notifications {
            Some(EventFeedSettings {
                filter: ActionFeedSettings {
                    actions: actions_or_default(
                        &asset.event_notification_actions,
                        EVENT_ACTION_PREFIX,
                        DEFAULT_EVENT_ACTION,
                    ),
                    excluded_categories: normalize_list(&asset.event_categories, ""),
                    excluded_subcategories: normalize_list(&asset.event_subcategories, ""),
                    severity: SeverityRange::new(
                        "Event",
                        asset.event_severity_lower,
                        asset.event_severity_upper,
                    )?,
                    limit: positive_limit("Event", asset.event_limit)?,
                },
                store_in_alert_containers: asset.store_event_notifs_in_alert_containers,
            })
        } else {
            None
        };

        Ok(Self {
            base_url: asset.base_url.trim().to_string(),
            username: asset.username.clone(),
            password: asset.password.clone(),
            verify_server_cert: asset.verify_server_cert,
            alert,
            dome,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn asset() -> AssetConfig {
        AssetConfig {
            base_url: " https://ironapi.example.com ".to_string(),
            username: "soar".to_string(),
            password: SecretString::from("pw"),
            ..AssetConfig::default()
        }
    }

    #[test]
    fn test_disabled_feeds_have_no_settings() {
        let settings = ConnectorSettings::from_asset(&asset()).unwrap();
        assert_eq!(settings.base_url, "https://ironapi.example.com");
        assert!(settings.alert.is_none());
        assert!(settings.dome.is_none());
        assert!(settings.event.is_none());
    }

    #[test]
    fn test_alert_actions_are_prefixed_and_normalised() {
        let mut config = asset();
        config.enable_alert_notifications = true;
        config.alert_notification_actions = CommaList::parse("alert created, Alert Updated,, ");
        config.alert_categories = CommaList::parse("recon , c2");
        config.alert_subcategories = CommaList::parse("port scan");

        let alert = ConnectorSettings::from_asset(&config).unwrap().alert.unwrap();
        assert_eq!(alert.actions, vec!["ANA_ALERT_CREATED", "ANA_ALERT_UPDATED"]);
        assert_eq!(alert.excluded_categories, vec!["RECON", "C2"]);
        assert_eq!(alert.excluded_subcategories, vec!["PORT_SCAN"]);
        assert_eq!(alert.severity, SeverityRange { lower: 0, upper: 1000 });
    }

    #[test]
    fn test_default_actions_when_blank() {
        let mut config = asset();
        config.enable_alert_notifications = true;
        config.enable_event_notifications = true;
        config.alert_notification_actions = CommaList::parse(" , ");

        let settings = ConnectorSettings::from_asset(&config).unwrap();
        assert_eq!(settings.alert.unwrap().actions, vec![DEFAULT_ALERT_ACTION]);
        assert_eq!(settings.event.unwrap().filter.actions, vec![DEFAULT_EVENT_ACTION]);
    }

    #[test]
    fn test_dome_categories_prefixed() {
        let mut config = asset();
        config.enable_dome_notifications = true;
        config.dome_categories = CommaList::parse("participant added, comment added");

        let dome = ConnectorSettings::from_asset(&config).unwrap().dome.unwrap();
        assert_eq!(
            dome.excluded_categories,
            vec!["DNC_PARTICIPANT_ADDED", "DNC_COMMENT_ADDED"]
        );
    }

    #[test]
    fn test_equal_severity_bounds_rejected() {
        let mut config = asset();
        config.enable_alert_notifications = true;
        config.alert_severity_lower = 500;
        config.alert_severity_upper = 500;

        let err = ConnectorSettings::from_asset(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Initialization Failed: Invalid Range for Alert Severity- 500 is not lower than 500"
        );
    }

    #[test]
    fn test_event_range_checked_only_when_enabled() {
        let mut config = asset();
        config.event_severity_lower = 900;
        config.event_severity_upper = 100;
        assert!(ConnectorSettings::from_asset(&config).is_ok());

        config.enable_event_notifications = true;
        let err = ConnectorSettings::from_asset(&config).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidSeverityRange { feed: "Event", lower: 900, upper: 100 }
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = asset();
        config.enable_dome_notifications = true;
        config.dome_limit = 0;
        assert_eq!(
            ConnectorSettings::from_asset(&config).unwrap_err(),
            SettingsError::InvalidLimit { feed: "Dome" }
        );
    }

    #[test]
    fn test_store_in_alert_containers_carried() {
        let mut config = asset();
        config.enable_event_notifications = true;
        config.store_event_notifs_in_alert_containers = true;
        assert!(ConnectorSettings::from_asset(&config).unwrap().event.unwrap().store_in_alert_containers);
    }

    #[test]
    fn test_severity_range_is_inclusive() {
        let range = SeverityRange::new("Alert", 100, 200).unwrap();
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(99));
        assert!(!range.contains(201));
    }

    proptest! {
        #[test]
        fn prop_normalized_tokens_have_no_spaces_or_lowercase(raw in "[a-zA-Z ]{0,20}") {
            let token = normalize_token(&raw);
            prop_assert!(!token.contains(' '));
            prop_assert_eq!(token.clone(), token.to_uppercase());
        }

        #[test]
        fn prop_normalize_list_drops_blank_entries(entries in prop::collection::vec("[a-z ]{0,8}", 0..6)) {
            let list = CommaList(entries.clone());
            let expected = entries.iter().filter(|e| !e.trim().is_empty()).count();
            prop_assert_eq!(normalize_list(&list, "ANA_").len(), expected);
        }
    }
}
