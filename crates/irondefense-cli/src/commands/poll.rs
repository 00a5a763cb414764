//! Poll command.

use clap::Parser;
use irondefense_connector::ActionId;
use serde_json::json;
use std::path::PathBuf;

use super::{Invocation, DEFAULT_OUTPUT_DIR};

/// Poll the enabled notification feeds
#[derive(Debug, Parser)]
pub struct PollCommand {
    /// Directory receiving containers.jsonl and artifacts.jsonl
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

impl PollCommand {
    pub fn invocation(self) -> Invocation {
        let mut invocation = Invocation::single(ActionId::OnPoll, json!({}));
        invocation.output_dir = self.output_dir;
        invocation
    }
}
