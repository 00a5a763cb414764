//! Alert commands.

use clap::{Args, Parser};
use irondefense_connector::ActionId;
use serde_json::json;

use super::Invocation;

/// Options shared by the commands that comment on an alert.
#[derive(Debug, Clone, Args)]
pub struct CommentArgs {
    /// Analyst comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Share the comment with IronDome participants
    #[arg(long)]
    pub share_comment_with_irondome: bool,
}

/// Rate an alert
#[derive(Debug, Parser)]
pub struct RateAlertCommand {
    /// Alert to rate
    #[arg(long)]
    pub alert_id: String,

    /// undecided, benign, suspicious or malicious
    #[arg(long)]
    pub analyst_severity: String,

    /// expected, unexpected or unknown
    #[arg(long)]
    pub analyst_expectation: String,

    #[command(flatten)]
    pub comment: CommentArgs,
}

impl RateAlertCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(
            ActionId::RateAlert,
            json!({
                "alert_id": self.alert_id,
                "comment": self.comment.comment,
                "share_comment_with_irondome": self.comment.share_comment_with_irondome,
                "analyst_severity": self.analyst_severity,
                "analyst_expectation": self.analyst_expectation,
            }),
        )
    }
}

/// Set the status of an alert
#[derive(Debug, Parser)]
pub struct SetAlertStatusCommand {
    #[arg(long)]
    pub alert_id: String,

    /// awaiting review, under review or closed
    #[arg(long)]
    pub alert_status: String,

    #[command(flatten)]
    pub comment: CommentArgs,
}

impl SetAlertStatusCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(
            ActionId::SetAlertStatus,
            json!({
                "alert_id": self.alert_id,
                "comment": self.comment.comment,
                "share_comment_with_irondome": self.comment.share_comment_with_irondome,
                "alert_status": self.alert_status,
            }),
        )
    }
}

/// Comment on an alert
#[derive(Debug, Parser)]
pub struct CommentOnAlertCommand {
    #[arg(long)]
    pub alert_id: String,

    #[command(flatten)]
    pub comment: CommentArgs,
}

impl CommentOnAlertCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(
            ActionId::CommentOnAlert,
            json!({
                "alert_id": self.alert_id,
                "comment": self.comment.comment,
                "share_comment_with_irondome": self.comment.share_comment_with_irondome,
            }),
        )
    }
}

/// Commands taking only an alert id
#[derive(Debug, Parser)]
pub struct AlertIdCommand {
    #[arg(long)]
    pub alert_id: String,
}

impl AlertIdCommand {
    pub fn invocation(self, action: ActionId) -> Invocation {
        Invocation::single(action, json!({ "alert_id": self.alert_id }))
    }
}

/// Search alerts
#[derive(Debug, Parser)]
pub struct GetAlertsCommand {
    /// Comma-separated alert ids
    #[arg(long)]
    pub alert_id: Option<String>,

    /// Comma-separated categories
    #[arg(long)]
    pub category: Option<String>,

    /// Comma-separated sub-categories
    #[arg(long)]
    pub sub_category: Option<String>,

    /// Comma-separated statuses
    #[arg(long)]
    pub status: Option<String>,

    /// Lowest severity to return (default 0)
    #[arg(long, allow_negative_numbers = true)]
    pub min_severity: Option<i64>,

    /// Highest severity to return (default 1000)
    #[arg(long, allow_negative_numbers = true)]
    pub max_severity: Option<i64>,
}

impl GetAlertsCommand {
    pub fn invocation(self) -> Invocation {
        Invocation::single(
            ActionId::GetAlerts,
            json!({
                "alert_id": self.alert_id,
                "category": self.category,
                "sub_category": self.sub_category,
                "status": self.status,
                "min_severity": self.min_severity,
                "max_severity": self.max_severity,
            }),
        )
    }
}
