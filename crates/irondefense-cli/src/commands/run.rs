//! Run an action file.
//!
//! The file mirrors what the platform hands a connector:
//!
//! ```json
//! {
//!   "identifier": "irondefense_get_event",
//!   "parameters": [{"event_id": "e-1"}],
//!   "config": {"base_url": "https://ironapi.example.com", "username": "soar", "password": "..."}
//! }
//! ```
//!
//! `config`, when present, replaces the asset file.

use clap::{Parser, ValueHint};
use irondefense_common_config::AssetConfig;
use irondefense_connector::ActionId;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use super::{Invocation, DEFAULT_OUTPUT_DIR};
use crate::error::CliError;

/// Run an action file
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Action file
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Directory receiving polled records
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Action file contents.
#[derive(Debug, Deserialize)]
pub struct ActionFile {
    pub identifier: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub config: Option<AssetConfig>,
}

impl ActionFile {
    pub fn parse(contents: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(contents)?)
    }

    fn into_invocation(self, output_dir: PathBuf) -> Result<Invocation, CliError> {
        let action: ActionId = self.identifier.parse()?;
        let parameters = if self.parameters.is_empty() {
            vec![Value::Object(serde_json::Map::new())]
        } else {
            self.parameters
        };
        Ok(Invocation {
            action,
            parameters,
            config: self.config,
            output_dir,
        })
    }
}

impl RunCommand {
    pub fn invocation(self) -> Result<Invocation, CliError> {
        let contents = std::fs::read_to_string(&self.file).map_err(|e| {
            CliError::validation(format!("cannot read action file {}: {e}", self.file.display()))
        })?;
        ActionFile::parse(&contents)?.into_invocation(self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Exit;
    use serde_json::json;

    #[test]
    fn test_parse_action_file() {
        let file = ActionFile::parse(
            r#"{
                "identifier": "irondefense_get_events",
                "parameters": [{"alert_id": "a-1"}, {"alert_id": "a-2"}],
                "config": {"base_url": "https://ironapi.example.com", "username": "soar", "password": "pw"}
            }"#,
        )
        .unwrap();

        let invocation = file.into_invocation(PathBuf::from("out")).unwrap();
        assert_eq!(invocation.action, ActionId::GetEvents);
        assert_eq!(invocation.parameters.len(), 2);
        assert_eq!(invocation.parameters[1], json!({"alert_id": "a-2"}));
        assert_eq!(invocation.config.unwrap().username, "soar");
    }

    #[test]
    fn test_missing_parameters_runs_once() {
        let invocation = ActionFile::parse(r#"{"identifier": "on_poll"}"#)
            .unwrap()
            .into_invocation(PathBuf::from("out"))
            .unwrap();
        assert_eq!(invocation.parameters, vec![json!({})]);
        assert!(invocation.config.is_none());
    }

    #[test]
    fn test_unknown_identifier_is_invalid_input() {
        let err = ActionFile::parse(r#"{"identifier": "irondefense_reboot"}"#)
            .unwrap()
            .into_invocation(PathBuf::from("out"))
            .unwrap_err();
        assert_eq!(err.exit(), Exit::ValidationError);
    }

    #[test]
    fn test_malformed_file_is_invalid_input() {
        let err = ActionFile::parse("{identifier").unwrap_err();
        assert_eq!(err.exit(), Exit::ValidationError);
    }
}
