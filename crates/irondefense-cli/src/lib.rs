//! IronDefense connector CLI
//!
//! Runs the connector's actions from the command line and prints their
//! results.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
