//! Action parameters and the request bodies they map to.
//!
//! Parameter structs deserialize from the platform's parameter objects
//! and serialize straight into IronAPI request bodies. The enums accept
//! the analyst-facing words (`benign`, `under review`) and serialize to
//! IronAPI's constants (`SEVERITY_BENIGN`, `STATUS_UNDER_REVIEW`).

use crate::error::ParamError;
use irondefense_common_config::normalize_token;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default lower bound for `get alerts` severity filtering.
pub const DEFAULT_MIN_SEVERITY: i64 = 0;
/// Default upper bound for `get alerts` severity filtering.
pub const DEFAULT_MAX_SEVERITY: i64 = 1000;

static PLATFORM_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+-\d+-\d+) (\d+:\d+\d+:\d+\.\d+\+\d+)$").expect("valid regex"));

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $param:literal {
            $($variant:ident => $user:literal, $wire:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Words an analyst may use.
            pub const USER_VALUES: &'static [&'static str] = &[$($user),+];

            /// IronAPI constant.
            pub fn wire_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Analyst-facing word.
            pub fn user_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $user,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParamError;

            fn from_str(s: &str) -> Result<Self, ParamError> {
                let wanted = s.trim().to_lowercase();
                $(
                    if wanted == $user || wanted.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ParamError::UnknownValue {
                    param: $param,
                    value: s.to_string(),
                    expected: Self::USER_VALUES.join(", "),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParamError;

            fn try_from(s: String) -> Result<Self, ParamError> {
                s.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.user_name())
            }
        }
    };
}

wire_enum! {
    /// Analyst's verdict on an alert.
    AnalystSeverity, "analyst_severity" {
        Undecided => "undecided", "SEVERITY_UNDECIDED";
        Benign => "benign", "SEVERITY_BENIGN";
        Suspicious => "suspicious", "SEVERITY_SUSPICIOUS";
        Malicious => "malicious", "SEVERITY_MALICIOUS";
    }
}

wire_enum! {
    /// Whether the analyst expected the activity.
    AnalystExpectation, "analyst_expectation" {
        Expected => "expected", "EXP_EXPECTED";
        Unexpected => "unexpected", "EXP_UNEXPECTED";
        Unknown => "unknown", "EXP_UNKNOWN";
    }
}

wire_enum! {
    /// Alert workflow status.
    AlertStatus, "alert_status" {
        AwaitingReview => "awaiting review", "STATUS_AWAITING_REVIEW";
        UnderReview => "under review", "STATUS_UNDER_REVIEW";
        Closed => "closed", "STATUS_CLOSED";
    }
}

/// `irondefense_rate_alert` parameters; serializes as the `/RateAlert` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateAlertParams {
    pub alert_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub share_comment_with_irondome: bool,
    pub analyst_severity: AnalystSeverity,
    pub analyst_expectation: AnalystExpectation,
}

/// `irondefense_set_alert_status` parameters; serializes as the `/SetAlertStatus` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAlertStatusParams {
    pub alert_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub share_comment_with_irondome: bool,
    #[serde(rename(serialize = "status", deserialize = "alert_status"))]
    pub alert_status: AlertStatus,
}

/// `irondefense_comment_on_alert` parameters; serializes as the `/CommentOnAlert` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentOnAlertParams {
    pub alert_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub share_comment_with_irondome: bool,
}

/// Parameters carrying a single alert id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertIdParams {
    pub alert_id: String,
}

/// Parameters carrying a single event id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventIdParams {
    pub event_id: String,
}

/// `irondefense_report_observed_bad_activity` parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportBadActivityParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    pub activity_start_time: String,
    #[serde(default)]
    pub activity_end_time: Option<String>,
}

/// `/ReportObservedBadActivity` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBadActivityRequest {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub ip: String,
    pub activity_start_time: String,
    pub activity_end_time: String,
}

impl ReportBadActivityParams {
    /// Fill defaults and convert platform timestamps to RFC 3339.
    pub fn to_request(&self) -> Result<ReportBadActivityRequest, ParamError> {
        if self.name.trim().is_empty() {
            return Err(ParamError::Missing { param: "name" });
        }
        if self.activity_start_time.trim().is_empty() {
            return Err(ParamError::Missing {
                param: "activity_start_time",
            });
        }

        let end = self
            .activity_end_time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.activity_start_time);

        Ok(ReportBadActivityRequest {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            domain: self.domain.clone().unwrap_or_default(),
            ip: self.ip.clone().unwrap_or_default(),
            activity_start_time: fix_timestamp(&self.activity_start_time),
            activity_end_time: fix_timestamp(end),
        })
    }
}

/// `irondefense_get_alerts` parameters. List-valued fields are comma-separated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetAlertsParams {
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub min_severity: Option<i64>,
    #[serde(default)]
    pub max_severity: Option<i64>,
}

/// Severity bounds in a `/GetAlerts` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityBounds {
    pub lower_bound: i64,
    pub upper_bound: i64,
}

/// `/GetAlerts` body. Absent lists are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetAlertsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<AlertStatus>>,
    pub severity: SeverityBounds,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn split_entries(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|e| !e.is_empty())
}

impl GetAlertsParams {
    /// Build the request body.
    pub fn to_request(&self) -> Result<GetAlertsRequest, ParamError> {
        let alert_id = non_blank(&self.alert_id)
            .map(|raw| split_entries(raw).map(str::to_string).collect());
        let category = non_blank(&self.category)
            .map(|raw| split_entries(raw).map(normalize_token).collect());
        let sub_category = non_blank(&self.sub_category)
            .map(|raw| split_entries(raw).map(normalize_token).collect());
        let status = match non_blank(&self.status) {
            Some(raw) => Some(
                split_entries(raw)
                    .map(AlertStatus::from_str)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(GetAlertsRequest {
            alert_id,
            category,
            sub_category,
            status,
            severity: SeverityBounds {
                lower_bound: self.min_severity.unwrap_or(DEFAULT_MIN_SEVERITY),
                upper_bound: self.max_severity.unwrap_or(DEFAULT_MAX_SEVERITY),
            },
        })
    }
}

/// `/GetAlertNotifications`, `/GetDomeNotifications` and `/GetEventNotifications` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitRequest {
    pub limit: u32,
}

/// Rewrite a platform timestamp (`2024-03-01 10:05:00.123+00`) as
/// RFC 3339 (`2024-03-01T10:05:00.123+00:00`). Anything else is returned
/// unchanged.
pub fn fix_timestamp(timestamp: &str) -> String {
    match PLATFORM_TIMESTAMP.captures(timestamp) {
        Some(caps) => format!("{}T{}:00", &caps[1], &caps[2]),
        None => timestamp.to_string(),
    }
}

/// Deserialize action parameters from a platform parameter object.
pub fn parse_params<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> Result<T, ParamError> {
    serde_json::from_value(value.clone()).map_err(|e| ParamError::Invalid(e.to_string()))
}
