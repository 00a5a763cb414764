//! Event commands.

use clap::Parser;
use irondefense_connector::ActionId;
use serde_json::json;

use super::Invocation;

/// Get a single event
#[derive(Debug, Parser)]
pub struct EventIdCommand {
    #[arg(long)]
    pub event_id: String,
}

impl EventIdCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(ActionId::GetEvent, json!({ "event_id": self.event_id }))
    }
}
