//! Action handlers against a mock IronAPI.

use irondefense_common_config::{parse_yaml, ConnectorSettings};
use irondefense_connector::{ActionContext, ActionId, ActionStatus, Connector, ConnectorState, MemorySink};
use irondefense_test_utils::{asset_yaml, MockIronApi};
use serde_json::{json, Value};

fn connector(api: &MockIronApi) -> Connector {
    let asset = parse_yaml(&asset_yaml(&api.base_url(), "")).unwrap();
    Connector::new(ConnectorSettings::from_asset(&asset).unwrap()).unwrap()
}

async fn run(connector: &Connector, action: ActionId, parameter: Value) -> irondefense_connector::ActionResult {
    let mut sink = MemorySink::new();
    let mut state = ConnectorState::default();
    let mut ctx = ActionContext {
        sink: &mut sink,
        state: &mut state,
    };
    connector.handle_action(action, &parameter, &mut ctx).await
}

#[tokio::test]
async fn test_connectivity_passes_on_empty_200() {
    let api = MockIronApi::start().await;
    api.expect_request("/Login", Value::Null, json!({})).await;

    let result = run(&connector(&api), ActionId::TestConnectivity, json!({})).await;
    assert_eq!(result.status, ActionStatus::Success);
    assert_eq!(result.message, "Test Connectivity to IronAPI Passed");
}

#[tokio::test]
async fn test_connectivity_failure_hides_details() {
    let api = MockIronApi::start().await;
    api.respond_json("/Login", 401, json!({"error": "bad credentials"})).await;

    let result = run(&connector(&api), ActionId::TestConnectivity, json!({})).await;
    assert_eq!(result.status, ActionStatus::Failed);
    assert_eq!(result.message, "Test Connectivity to IronAPI Failed");
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn test_rate_alert_maps_values() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/RateAlert",
        json!({
            "alert_id": "a-1",
            "comment": "confirmed",
            "share_comment_with_irondome": true,
            "analyst_severity": "SEVERITY_MALICIOUS",
            "analyst_expectation": "EXP_UNEXPECTED"
        }),
        json!({}),
    )
    .await;

    let result = run(
        &connector(&api),
        ActionId::RateAlert,
        json!({
            "alert_id": "a-1",
            "comment": "confirmed",
            "share_comment_with_irondome": true,
            "analyst_severity": "Malicious",
            "analyst_expectation": "unexpected"
        }),
    )
    .await;

    assert_eq!(result.message, "Alert rating was successful");
    assert_eq!(result.data, vec![json!({})]);
}

#[tokio::test]
async fn test_invalid_parameter_fails_before_request() {
    let api = MockIronApi::start().await;

    let result = run(
        &connector(&api),
        ActionId::RateAlert,
        json!({
            "alert_id": "a-1",
            "analyst_severity": "catastrophic",
            "analyst_expectation": "expected"
        }),
    )
    .await;

    assert_eq!(result.status, ActionStatus::Failed);
    assert!(result.message.starts_with("Alert rating failed. Error: "));
    assert!(result.message.contains("catastrophic"));
    assert!(api.received().await.is_empty());
}

#[tokio::test]
async fn test_set_alert_status_body() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/SetAlertStatus",
        json!({
            "alert_id": "a-1",
            "comment": null,
            "share_comment_with_irondome": false,
            "status": "STATUS_UNDER_REVIEW"
        }),
        json!({}),
    )
    .await;

    let result = run(
        &connector(&api),
        ActionId::SetAlertStatus,
        json!({"alert_id": "a-1", "alert_status": "under review"}),
    )
    .await;
    assert_eq!(result.message, "Setting alert status was successful");
}

#[tokio::test]
async fn test_comment_on_alert() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/CommentOnAlert",
        json!({"alert_id": "a-1", "comment": "seen", "share_comment_with_irondome": false}),
        json!({}),
    )
    .await;

    let result = run(
        &connector(&api),
        ActionId::CommentOnAlert,
        json!({"alert_id": "a-1", "comment": "seen"}),
    )
    .await;
    assert_eq!(result.message, "Adding comment to alert was successful");
}

#[tokio::test]
async fn test_report_bad_activity_fills_defaults() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/ReportObservedBadActivity",
        json!({
            "name": "beacon",
            "description": "",
            "domain": "evil.example",
            "ip": "",
            "activity_start_time": "2024-03-01T10:05:00.5+00:00",
            "activity_end_time": "2024-03-01T10:05:00.5+00:00"
        }),
        json!({}),
    )
    .await;

    let result = run(
        &connector(&api),
        ActionId::ReportObservedBadActivity,
        json!({
            "name": "beacon",
            "domain": "evil.example",
            "activity_start_time": "2024-03-01 10:05:00.5+00"
        }),
    )
    .await;
    assert_eq!(result.message, "Reporting bad activity to IronDefense was successful");
}

#[tokio::test]
async fn test_get_alerts_builds_request_and_summary() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/GetAlerts",
        json!({
            "alert_id": ["a-1", "a-2"],
            "category": ["COMMAND_AND_CONTROL"],
            "status": ["STATUS_CLOSED"],
            "severity": {"lower_bound": 0, "upper_bound": 750}
        }),
        json!({"alerts": [{"id": "a-1"}, {"id": "a-2"}]}),
    )
    .await;

    let result = run(
        &connector(&api),
        ActionId::GetAlerts,
        json!({
            "alert_id": "a-1,a-2",
            "category": "command and control",
            "status": "closed",
            "max_severity": 750
        }),
    )
    .await;

    assert_eq!(result.message, "Retrieving alerts was successful");
    assert_eq!(result.summary["total_alerts"], 2);
    assert_eq!(result.data[0]["alerts"][1]["id"], "a-2");
}

#[tokio::test]
async fn test_get_alert_irondome_info() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/GetAlertIronDomeInformation",
        json!({"alert_id": "a-1"}),
        json!({"dome_notifications": []}),
    )
    .await;

    let result = run(&connector(&api), ActionId::GetAlertIronDomeInfo, json!({"alert_id": "a-1"})).await;
    assert_eq!(result.message, "Retrieving IronDome alert info was successful");
}

#[tokio::test]
async fn test_get_events_and_event() {
    let api = MockIronApi::start().await;
    api.expect_request("/GetEvents", json!({"alert_id": "a-1"}), json!({"events": [{"id": "e-1"}]}))
        .await;
    api.expect_request("/GetEvent", json!({"event_id": "e-1"}), json!({"event": {"id": "e-1"}}))
        .await;

    let connector = connector(&api);
    let events = run(&connector, ActionId::GetEvents, json!({"alert_id": "a-1"})).await;
    assert_eq!(events.message, "Retrieving events was successful");
    assert_eq!(events.summary["total_events"], 1);

    let event = run(&connector, ActionId::GetEvent, json!({"event_id": "e-1"})).await;
    assert_eq!(event.message, "Retrieving event was successful");
    assert_eq!(event.data[0]["event"]["id"], "e-1");
}

#[tokio::test]
async fn test_html_error_page_becomes_failure_message() {
    let api = MockIronApi::start().await;
    api.respond_html(
        "/GetEvent",
        502,
        "<html><body><h1>Bad Gateway</h1><p>upstream timed out</p></body></html>",
    )
    .await;

    let result = run(&connector(&api), ActionId::GetEvent, json!({"event_id": "e-1"})).await;
    assert_eq!(
        result.message,
        "Retrieving event failed. Error: Status Code: 502. Data from server:\nBad Gateway\nupstream timed out\n"
    );
}

#[tokio::test]
async fn test_empty_error_response() {
    let api = MockIronApi::start().await;
    api.respond_empty("/GetEvents", 500).await;

    let result = run(&connector(&api), ActionId::GetEvents, json!({"alert_id": "a-1"})).await;
    assert_eq!(
        result.message,
        "Retrieving events failed. Error: Empty response and no information in the header"
    );
}

#[tokio::test]
async fn test_connection_error_message() {
    let asset = parse_yaml(&asset_yaml("http://127.0.0.1:9", "")).unwrap();
    let connector = Connector::new(ConnectorSettings::from_asset(&asset).unwrap()).unwrap();

    let result = run(&connector, ActionId::GetEvent, json!({"event_id": "e-1"})).await;
    assert!(result
        .message
        .starts_with("Retrieving event failed. Error: Error Connecting to server. Details: "));
}
