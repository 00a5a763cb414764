//! Connector errors.

use crate::filter::FeedKind;
use crate::ingest::{IngestError, RecordKind};
use crate::state::StateError;
use irondefense_common_config::SettingsError;
use irondefense_common_http::{HttpError, ResponseError};
use thiserror::Error;

/// Invalid action parameters. Raised before any request is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter '{param}'")]
    Missing { param: &'static str },

    #[error("invalid value '{value}' for '{param}', expected one of: {expected}")]
    UnknownValue {
        param: &'static str,
        value: String,
        expected: String,
    },

    #[error("invalid parameters: {0}")]
    Invalid(String),
}

/// Errors surfaced as action failures.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Malformed {feed} notification: {message}")]
    Malformed { feed: FeedKind, message: String },

    #[error("Unexpected response from server: {0}")]
    UnexpectedPayload(String),

    #[error("{feed} Notification {record} creation failed: {source}")]
    Ingest {
        feed: FeedKind,
        record: RecordKind,
        #[source]
        source: IngestError,
    },

    #[error("{feed} notifications are not enabled")]
    FeedDisabled { feed: FeedKind },
}

impl ConnectorError {
    /// True when the failure came from the network or the server rather
    /// than from local input.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Response(_) | Self::UnexpectedPayload(_))
    }
}
