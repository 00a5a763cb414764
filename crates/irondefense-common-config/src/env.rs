//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    /// Asset file path.
    pub const IRONDEFENSE_CONFIG: &str = "IRONDEFENSE_CONFIG";
    /// Overrides `base_url`.
    pub const IRONDEFENSE_BASE_URL: &str = "IRONDEFENSE_BASE_URL";
    /// Overrides `username`.
    pub const IRONDEFENSE_USERNAME: &str = "IRONDEFENSE_USERNAME";
    /// Overrides `password`.
    pub const IRONDEFENSE_PASSWORD: &str = "IRONDEFENSE_PASSWORD";
}

/// Environment access.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` from the working directory.
    ///
    /// Missing files are fine; variables already set are not overwritten.
    pub fn init() -> Result<Self, EnvError> {
        for file in [".env", ".env.local"] {
            match dotenvy::from_filename(file) {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(EnvError::DotenvError(e)),
            }
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional, non-empty string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}
