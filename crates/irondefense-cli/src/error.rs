//! CLI error handling.

use std::io;
use std::process::ExitCode;

use irondefense_common_config::{ConfigError, SettingsError};
use irondefense_connector::{ConnectorError, IngestError, StateError, UnknownAction};
use thiserror::Error;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    ActionFailed = 1,
    ConfigError = 2,
    NetworkError = 4,
    ValidationError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Connector(#[from] ConnectorError),

    #[error("{0}")]
    State(#[from] StateError),

    #[error("cannot open output directory: {0}")]
    Ingest(#[from] IngestError),

    #[error("{message}")]
    Validation { message: String },

    #[error("{failed} of {total} action runs failed")]
    ActionFailed { failed: usize, total: usize },

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Exit code for this error
    pub fn exit(&self) -> Exit {
        match self {
            Self::Config(_) | Self::Settings(_) => Exit::ConfigError,
            Self::Connector(_) | Self::State(_) | Self::Ingest(_) => Exit::NetworkError,
            Self::Validation { .. } => Exit::ValidationError,
            Self::ActionFailed { .. } | Self::Io(_) | Self::Other(_) => Exit::ActionFailed,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit().into()
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<UnknownAction> for CliError {
    fn from(err: UnknownAction) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("Invalid JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Settings(SettingsError::InvalidLimit { feed: "Alert" }).exit(),
            Exit::ConfigError
        );
        assert_eq!(CliError::validation("bad").exit(), Exit::ValidationError);
        assert_eq!(
            CliError::ActionFailed { failed: 1, total: 2 }.exit(),
            Exit::ActionFailed
        );
        assert_eq!(
            CliError::from(UnknownAction("nope".to_string())).exit(),
            Exit::ValidationError
        );
    }

    #[test]
    fn test_action_failed_message() {
        let err = CliError::ActionFailed { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "1 of 3 action runs failed");
    }
}
