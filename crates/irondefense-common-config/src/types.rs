//! Configuration types.

use irondefense_common_secret::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Default lower severity bound for the alert and event feeds.
pub const DEFAULT_SEVERITY_LOWER: i64 = 0;
/// Default upper severity bound for the alert and event feeds.
pub const DEFAULT_SEVERITY_UPPER: i64 = 1000;
/// Default number of notifications requested per feed.
pub const DEFAULT_FEED_LIMIT: u32 = 100;

/// A list given either as a comma-separated string or a YAML/JSON sequence.
///
/// The platform's asset form only has text fields, so `"a, b"` and
/// `[a, b]` both load to the same two raw entries. Entries are kept as
/// written; normalisation happens in [`crate::settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommaList(pub Vec<String>);

impl CommaList {
    /// Split a comma-separated string.
    pub fn parse(raw: &str) -> Self {
        Self(raw.split(',').map(str::to_string).collect())
    }

    /// Raw entries.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// True when every entry is blank.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|e| e.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for CommaList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Items(Vec<String>),
            Nothing(()),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => CommaList::parse(&s),
            Raw::Items(items) => CommaList(items),
            Raw::Nothing(()) => CommaList::default(),
        })
    }
}

/// Asset configuration as written by the operator.
///
/// Keys match the platform's asset configuration keys so a `config`
/// object lifted from a platform action file deserializes directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// IronAPI host, e.g. `https://ironapi.example.com`. `/IronApi` is appended.
    pub base_url: String,
    /// Basic auth user.
    pub username: String,
    /// Basic auth password.
    pub password: SecretString,
    /// Verify the server's TLS certificate.
    pub verify_server_cert: bool,

    pub enable_alert_notifications: bool,
    pub alert_notification_actions: CommaList,
    pub alert_categories: CommaList,
    pub alert_subcategories: CommaList,
    pub alert_severity_lower: i64,
    pub alert_severity_upper: i64,
    pub alert_limit: u32,

    pub enable_dome_notifications: bool,
    pub dome_categories: CommaList,
    pub dome_limit: u32,

    pub enable_event_notifications: bool,
    pub event_notification_actions: CommaList,
    pub event_categories: CommaList,
    pub event_subcategories: CommaList,
    pub event_severity_lower: i64,
    pub event_severity_upper: i64,
    pub event_limit: u32,
    /// File event notifications under the container of their alert.
    pub store_event_notifs_in_alert_containers: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: SecretString::default(),
            verify_server_cert: true,
            enable_alert_notifications: false,
            alert_notification_actions: CommaList::default(),
            alert_categories: CommaList::default(),
            alert_subcategories: CommaList::default(),
            alert_severity_lower: DEFAULT_SEVERITY_LOWER,
            alert_severity_upper: DEFAULT_SEVERITY_UPPER,
            alert_limit: DEFAULT_FEED_LIMIT,
            enable_dome_notifications: false,
            dome_categories: CommaList::default(),
            dome_limit: DEFAULT_FEED_LIMIT,
            enable_event_notifications: false,
            event_notification_actions: CommaList::default(),
            event_categories: CommaList::default(),
            event_subcategories: CommaList::default(),
            event_severity_lower: DEFAULT_SEVERITY_LOWER,
            event_severity_upper: DEFAULT_SEVERITY_UPPER,
            event_limit: DEFAULT_FEED_LIMIT,
            store_event_notifs_in_alert_containers: false,
        }
    }
}
