//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use irondefense_common_config::DEFAULT_CONFIG_FILE;
use irondefense_common_log::{LogConfig, LogLevel};

use crate::commands::{
    self, AlertIdCommand, CommentOnAlertCommand, EventIdCommand, GetAlertsCommand, Invocation,
    PollCommand, RateAlertCommand, ReportBadActivityCommand, RunCommand, SetAlertStatusCommand,
};
use crate::error::CliError;
use irondefense_connector::ActionId;

/// IronDefense connector
///
/// Runs IronDefense actions against IronAPI the way an orchestration
/// platform would: one action, one request, one result.
#[derive(Debug, Parser)]
#[command(
    name = "irondefense",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to the asset configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "IRONDEFENSE_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        value_hint = ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// State file carried between runs
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate credentials against IronAPI
    TestConnectivity,

    /// Rate an alert
    RateAlert(RateAlertCommand),

    /// Set the status of an alert
    SetAlertStatus(SetAlertStatusCommand),

    /// Comment on an alert
    CommentOnAlert(CommentOnAlertCommand),

    /// Report observed bad activity to IronDefense
    ReportBadActivity(ReportBadActivityCommand),

    /// Get IronDome information for an alert
    GetAlertIrondomeInfo(AlertIdCommand),

    /// Search alerts
    GetAlerts(GetAlertsCommand),

    /// Get the events of an alert
    GetEvents(AlertIdCommand),

    /// Get a single event
    GetEvent(EventIdCommand),

    /// Poll the enabled notification feeds into an output directory
    Poll(PollCommand),

    /// Run an action file in the platform's format
    Run(RunCommand),
}

impl Command {
    fn invocation(self) -> Result<Invocation, CliError> {
        match self {
            Command::TestConnectivity => Ok(Invocation::single(
                ActionId::TestConnectivity,
                serde_json::json!({}),
            )),
            Command::RateAlert(cmd) => Ok(cmd.invocation()),
            Command::SetAlertStatus(cmd) => Ok(cmd.invocation()),
            Command::CommentOnAlert(cmd) => Ok(cmd.invocation()),
            Command::ReportBadActivity(cmd) => Ok(cmd.invocation()),
            Command::GetAlertIrondomeInfo(cmd) => Ok(cmd.invocation(ActionId::GetAlertIronDomeInfo)),
            Command::GetAlerts(cmd) => Ok(cmd.invocation()),
            Command::GetEvents(cmd) => Ok(cmd.invocation(ActionId::GetEvents)),
            Command::GetEvent(cmd) => Ok(cmd.invocation()),
            Command::Poll(cmd) => Ok(cmd.invocation()),
            Command::Run(cmd) => cmd.invocation(),
        }
    }
}

impl Cli {
    /// Logging configuration: environment first, then -v/-q.
    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_env();
        if self.quiet {
            return config.with_level(LogLevel::Error);
        }
        let mut level = config.level;
        for _ in 0..self.verbose {
            level = level.louder();
        }
        config.with_level(level)
    }

    /// Execute the selected command
    pub async fn execute(self) -> Result<(), CliError> {
        let ctx = CommandContext {
            config_path: self.config,
            state_path: self.state,
            format: self.format,
        };
        let invocation = self.command.invocation()?;
        commands::execute(&ctx, invocation).await
    }
}

/// Context passed to all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config_path: PathBuf,
    pub state_path: Option<PathBuf>,
    pub format: OutputFormat,
}
