//! Action handlers and dispatch.

use crate::client::IronApiClient;
use crate::error::ConnectorError;
use crate::filter::FeedKind;
use crate::ingest::IngestSink;
use crate::params::{
    parse_params, AlertIdParams, CommentOnAlertParams, EventIdParams, GetAlertsParams,
    RateAlertParams, ReportBadActivityParams, SetAlertStatusParams,
};
use crate::poll::{self, FeedSummary, PollSummary};
use crate::result::ActionResult;
use crate::state::ConnectorState;
use chrono::Utc;
use irondefense_common_config::ConnectorSettings;
use irondefense_common_log::spans::action_span;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn, Instrument};

/// Actions the connector answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    TestConnectivity,
    RateAlert,
    SetAlertStatus,
    CommentOnAlert,
    ReportObservedBadActivity,
    GetAlertIronDomeInfo,
    GetAlerts,
    GetEvents,
    GetEvent,
    OnPoll,
}

impl ActionId {
    pub const ALL: [ActionId; 10] = [
        ActionId::TestConnectivity,
        ActionId::RateAlert,
        ActionId::SetAlertStatus,
        ActionId::CommentOnAlert,
        ActionId::ReportObservedBadActivity,
        ActionId::GetAlertIronDomeInfo,
        ActionId::GetAlerts,
        ActionId::GetEvents,
        ActionId::GetEvent,
        ActionId::OnPoll,
    ];

    /// Platform identifier.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::TestConnectivity => "test_connectivity",
            Self::RateAlert => "irondefense_rate_alert",
            Self::SetAlertStatus => "irondefense_set_alert_status",
            Self::CommentOnAlert => "irondefense_comment_on_alert",
            Self::ReportObservedBadActivity => "irondefense_report_observed_bad_activity",
            Self::GetAlertIronDomeInfo => "irondefense_get_alert_irondome_info",
            Self::GetAlerts => "irondefense_get_alerts",
            Self::GetEvents => "irondefense_get_events",
            Self::GetEvent => "irondefense_get_event",
            Self::OnPoll => "on_poll",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::TestConnectivity => "Test Connectivity to IronAPI Passed",
            Self::RateAlert => "Alert rating was successful",
            Self::SetAlertStatus => "Setting alert status was successful",
            Self::CommentOnAlert => "Adding comment to alert was successful",
            Self::ReportObservedBadActivity => "Reporting bad activity to IronDefense was successful",
            Self::GetAlertIronDomeInfo => "Retrieving IronDome alert info was successful",
            Self::GetAlerts => "Retrieving alerts was successful",
            Self::GetEvents => "Retrieving events was successful",
            Self::GetEvent => "Retrieving event was successful",
            Self::OnPoll => "Polling notifications was successful",
        }
    }

    /// Text put in front of the error message when the action fails.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::TestConnectivity => "Test Connectivity to IronAPI Failed",
            Self::RateAlert => "Alert rating failed. Error: ",
            Self::SetAlertStatus => "Setting alert status failed. Error: ",
            Self::CommentOnAlert => "Adding comment failed. Error: ",
            Self::ReportObservedBadActivity => "Reporting bad activity to IronDefense failed. Error: ",
            Self::GetAlertIronDomeInfo => "Retrieving IronDome alert info failed. Error: ",
            Self::GetAlerts => "Retrieving alerts failed. Error: ",
            Self::GetEvents => "Retrieving events failed. Error: ",
            Self::GetEvent => "Retrieving event failed. Error: ",
            // Poll failures report each failed feed's own message.
            Self::OnPoll => "",
        }
    }

    fn failure_message(&self, err: &ConnectorError) -> String {
        match self {
            // Connectivity failures only say that they failed; details go to the log.
            Self::TestConnectivity => self.failure_prefix().to_string(),
            _ => format!("{}{}", self.failure_prefix(), err),
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Unknown action identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action identifier '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for ActionId {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, UnknownAction> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.identifier() == wanted)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Platform collaborators available to an action.
pub struct ActionContext<'a> {
    pub sink: &'a mut dyn IngestSink,
    pub state: &'a mut ConnectorState,
}

/// IronDefense connector: settings plus an authenticated client.
pub struct Connector {
    settings: ConnectorSettings,
    client: IronApiClient,
}

impl Connector {
    pub fn new(settings: ConnectorSettings) -> Result<Self, ConnectorError> {
        let client = IronApiClient::new(&settings)?;
        Ok(Self { settings, client })
    }

    /// `POST /Login` with a null body.
    pub async fn test_connectivity(&self) -> Result<Value, ConnectorError> {
        info!("Connecting to IronAPI");
        self.client.post("/Login", &Value::Null).await
    }

    pub async fn rate_alert(&self, params: &RateAlertParams) -> Result<Value, ConnectorError> {
        self.client.post("/RateAlert", params).await
    }

    pub async fn set_alert_status(&self, params: &SetAlertStatusParams) -> Result<Value, ConnectorError> {
        self.client.post("/SetAlertStatus", params).await
    }

    pub async fn comment_on_alert(&self, params: &CommentOnAlertParams) -> Result<Value, ConnectorError> {
        self.client.post("/CommentOnAlert", params).await
    }

    pub async fn report_observed_bad_activity(
        &self,
        params: &ReportBadActivityParams,
    ) -> Result<Value, ConnectorError> {
        let request = params.to_request()?;
        self.client.post("/ReportObservedBadActivity", &request).await
    }

    pub async fn get_alert_irondome_info(&self, params: &AlertIdParams) -> Result<Value, ConnectorError> {
        self.client.post("/GetAlertIronDomeInformation", params).await
    }

    pub async fn get_alerts(&self, params: &GetAlertsParams) -> Result<Value, ConnectorError> {
        let request = params.to_request()?;
        self.client.post("/GetAlerts", &request).await
    }

    pub async fn get_events(&self, params: &AlertIdParams) -> Result<Value, ConnectorError> {
        self.client.post("/GetEvents", params).await
    }

    pub async fn get_event(&self, params: &EventIdParams) -> Result<Value, ConnectorError> {
        self.client.post("/GetEvent", params).await
    }

    /// Poll every enabled feed.
    pub async fn poll(&self, sink: &mut dyn IngestSink) -> PollSummary {
        poll::poll_all(&self.client, &self.settings, sink).await
    }

    /// Poll a single feed.
    pub async fn poll_feed(
        &self,
        feed: FeedKind,
        sink: &mut dyn IngestSink,
    ) -> Result<FeedSummary, ConnectorError> {
        poll::poll_feed(&self.client, &self.settings, feed, sink).await
    }

    async fn call(&self, action: ActionId, parameter: &Value) -> Result<Value, ConnectorError> {
        match action {
            ActionId::TestConnectivity => self.test_connectivity().await,
            ActionId::RateAlert => self.rate_alert(&parse_params(parameter)?).await,
            ActionId::SetAlertStatus => self.set_alert_status(&parse_params(parameter)?).await,
            ActionId::CommentOnAlert => self.comment_on_alert(&parse_params(parameter)?).await,
            ActionId::ReportObservedBadActivity => {
                self.report_observed_bad_activity(&parse_params(parameter)?).await
            }
            ActionId::GetAlertIronDomeInfo => {
                self.get_alert_irondome_info(&parse_params(parameter)?).await
            }
            ActionId::GetAlerts => self.get_alerts(&parse_params(parameter)?).await,
            ActionId::GetEvents => self.get_events(&parse_params(parameter)?).await,
            ActionId::GetEvent => self.get_event(&parse_params(parameter)?).await,
            ActionId::OnPoll => Err(ConnectorError::UnexpectedPayload(
                "on_poll is not a single-request action".to_string(),
            )),
        }
    }

    async fn run_poll(&self, mut result: ActionResult, ctx: &mut ActionContext<'_>) -> ActionResult {
        let summary = self.poll(&mut *ctx.sink).await;

        for feed in &summary.completed {
            if let Ok(value) = serde_json::to_value(feed) {
                result.update_summary(feed.feed.as_str(), value);
            }
        }
        for feed in &summary.failed {
            result.update_summary(feed.feed.as_str(), serde_json::json!({ "error": feed.message }));
        }

        if summary.is_success() {
            ctx.state.set_last_poll(Utc::now());
            result.succeed(ActionId::OnPoll.success_message())
        } else {
            result.fail(summary.failure_message())
        }
    }

    /// Run one action with one parameter object.
    pub async fn handle_action(
        &self,
        action: ActionId,
        parameter: &Value,
        ctx: &mut ActionContext<'_>,
    ) -> ActionResult {
        async {
            info!("In action handler for: {}", action);
            let mut result = ActionResult::new(action.identifier(), parameter.clone());
            if action == ActionId::OnPoll {
                return self.run_poll(result, ctx).await;
            }

            match self.call(action, parameter).await {
                Ok(response) => {
                    debug!(response = %response, "Action response");
                    if let Some((key, count)) = list_len(&response, action) {
                        result.update_summary(key, count);
                    }
                    result.add_data(response);
                    result.succeed(action.success_message())
                }
                Err(e) => {
                    if e.is_remote() {
                        error!(error = %e, "{} failed", action);
                    } else {
                        warn!(error = %e, "{} rejected", action);
                    }
                    result.fail(action.failure_message(&e))
                }
            }
        }
        .instrument(action_span(action.identifier()))
        .await
    }
}

/// Summary count for list-returning actions.
fn list_len(response: &Value, action: ActionId) -> Option<(&'static str, usize)> {
    let (key, summary_key) = match action {
        ActionId::GetAlerts => ("alerts", "total_alerts"),
        ActionId::GetEvents => ("events", "total_events"),
        _ => return None,
    };
    response
        .get(key)
        .and_then(Value::as_array)
        .map(|items| (summary_key, items.len()))
}
