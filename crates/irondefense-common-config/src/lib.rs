//! Asset configuration for the IronDefense connector.
//!
//! An asset file (`irondefense.yaml` by default) carries the IronAPI
//! endpoint, credentials and the notification feed settings. This crate
//! loads it, expands `${VAR}` references, validates it and normalises it
//! into [`ConnectorSettings`].

pub mod env;
pub mod loader;
pub mod settings;
pub mod types;

pub use env::*;
pub use loader::*;
pub use settings::*;
pub use types::*;
