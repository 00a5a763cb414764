//! Command implementations.
//!
//! Every subcommand reduces to an [`Invocation`]: one action identifier and
//! the parameter objects to run it with, in order.

mod alerts;
mod events;
mod poll;
mod report;
mod run;

pub use alerts::{
    AlertIdCommand, CommentArgs, CommentOnAlertCommand, GetAlertsCommand, RateAlertCommand,
    SetAlertStatusCommand,
};
pub use events::EventIdCommand;
pub use poll::PollCommand;
pub use report::ReportBadActivityCommand;
pub use run::{ActionFile, RunCommand};

use std::path::PathBuf;

use irondefense_common_config::{validate, AssetConfig, ConfigLoader, ConnectorSettings};
use irondefense_connector::{
    ActionContext, ActionId, ActionResult, Connector, ConnectorState, IngestSink, JsonlSink,
    MemorySink, StateStore,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, ActionReport};

/// Directory polled records are written to when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "irondefense-ingest";

/// One action and the parameter objects to run it with.
#[derive(Debug)]
pub struct Invocation {
    pub action: ActionId,
    pub parameters: Vec<Value>,
    /// Replaces the asset file when set.
    pub config: Option<AssetConfig>,
    pub output_dir: PathBuf,
}

impl Invocation {
    pub fn single(action: ActionId, parameter: Value) -> Self {
        Self {
            action,
            parameters: vec![parameter],
            config: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

fn load_settings(
    ctx: &CommandContext,
    config: Option<&AssetConfig>,
) -> Result<ConnectorSettings, CliError> {
    match config {
        Some(asset) => {
            validate(asset)?;
            Ok(ConnectorSettings::from_asset(asset)?)
        }
        None => {
            debug!(path = %ctx.config_path.display(), "Loading asset file");
            Ok(ConfigLoader::new(&ctx.config_path).load_settings()?)
        }
    }
}

/// Run an invocation and print its results.
pub async fn execute(ctx: &CommandContext, invocation: Invocation) -> Result<(), CliError> {
    let settings = load_settings(ctx, invocation.config.as_ref())?;
    let connector = Connector::new(settings)?;

    let store = ctx.state_path.as_ref().map(StateStore::new);
    let mut state = match &store {
        Some(store) => store.load()?,
        None => ConnectorState::default(),
    };

    let mut sink: Box<dyn IngestSink> = if invocation.action == ActionId::OnPoll {
        info!(dir = %invocation.output_dir.display(), "Writing polled records");
        Box::new(JsonlSink::open(&invocation.output_dir)?)
    } else {
        Box::new(MemorySink::new())
    };

    let mut results: Vec<ActionResult> = Vec::with_capacity(invocation.parameters.len());
    for parameter in &invocation.parameters {
        let mut action_ctx = ActionContext {
            sink: sink.as_mut(),
            state: &mut state,
        };
        let result = connector
            .handle_action(invocation.action, parameter, &mut action_ctx)
            .await;
        results.push(result);
    }

    print_output(ctx, &ActionReport::new(&results))?;

    if let Some(store) = &store {
        store.save(&state)?;
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        return Err(CliError::ActionFailed {
            failed,
            total: results.len(),
        });
    }
    Ok(())
}
