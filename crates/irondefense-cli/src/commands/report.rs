//! Report observed bad activity.

use clap::Parser;
use irondefense_connector::ActionId;
use serde_json::json;

use super::Invocation;

/// Report observed bad activity to IronDefense
#[derive(Debug, Parser)]
pub struct ReportBadActivityCommand {
    /// Name of the activity
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Domain involved in the activity
    #[arg(long)]
    pub domain: Option<String>,

    /// IP address involved in the activity
    #[arg(long)]
    pub ip: Option<String>,

    /// When the activity started (RFC 3339 or `YYYY-MM-DD HH:MM:SS.f+HH`)
    #[arg(long)]
    pub activity_start_time: String,

    /// When the activity ended; defaults to the start time
    #[arg(long)]
    pub activity_end_time: Option<String>,
}

impl ReportBadActivityCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(
            ActionId::ReportObservedBadActivity,
            json!({
                "name": self.name,
                "description": self.description,
                "domain": self.domain,
                "ip": self.ip,
                "activity_start_time": self.activity_start_time,
                "activity_end_time": self.activity_end_time,
            }),
        )
    }
}
