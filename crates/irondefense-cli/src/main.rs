//! IronDefense connector CLI
//!
//! Main entry point for the `irondefense` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use irondefense_cli::cli::Cli;
use irondefense_cli::error::Exit;
use irondefense_common_config::Environment;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = Environment::init();

    if let Err(e) = irondefense_common_log::init(cli.log_config()) {
        eprintln!("{e}");
    }
    if let Err(e) = env {
        warn!("{e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create Tokio runtime: {e}");
            return Exit::ActionFailed.into();
        }
    };

    match runtime.block_on(cli.execute()) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    }
}
