//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::settings::{ConnectorSettings, SettingsError};
use crate::types::AssetConfig;
use irondefense_common_secret::SecretString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "irondefense.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Configuration loader for a single asset file.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given asset file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, expand, apply environment overrides and validate.
    pub fn load(&self) -> Result<AssetConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound {
                path: self.path.clone(),
            });
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let mut config = parse_yaml(&contents)?;
        apply_env_overrides(&mut config);
        validate(&config)?;
        Ok(config)
    }

    /// Load and normalise into connector settings.
    pub fn load_settings(&self) -> Result<ConnectorSettings, ConfigError> {
        let config = self.load()?;
        Ok(ConnectorSettings::from_asset(&config)?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

/// Parse YAML after expanding environment references.
pub fn parse_yaml(contents: &str) -> Result<AssetConfig, ConfigError> {
    let expanded = expand_env_vars(contents)?;
    serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
        ConfigError::ValidationError {
            message: e.to_string(),
        }
    })?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

/// Environment variables win over file values for endpoint and credentials.
pub fn apply_env_overrides(config: &mut AssetConfig) {
    if let Some(url) = Environment::get(vars::IRONDEFENSE_BASE_URL) {
        config.base_url = url;
    }
    if let Some(user) = Environment::get(vars::IRONDEFENSE_USERNAME) {
        config.username = user;
    }
    if let Some(password) = Environment::get(vars::IRONDEFENSE_PASSWORD) {
        config.password = SecretString::new(password);
    }
}

/// Validate the connection part of an asset configuration.
///
/// Feed settings are checked by [`ConnectorSettings::from_asset`].
pub fn validate(config: &AssetConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            message: "base_url is required".to_string(),
        });
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            message: format!("base_url must start with http:// or https://, got {base_url}"),
        });
    }
    if config.username.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            message: "username is required".to_string(),
        });
    }
    if config.password.is_blank() {
        return Err(ConfigError::ValidationError {
            message: "password is required".to_string(),
        });
    }
    Ok(())
}
