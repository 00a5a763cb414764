//! End-to-end runs of the `irondefense` binary against a mock IronAPI.

mod common;

use common::json::{assert_status, parse_output};
use common::{OutputAssertions, TestContext};
use irondefense_test_utils::fixtures::{alert, alert_notification};
use irondefense_test_utils::MockIronApi;
use predicates::prelude::*;
use serde_json::{json, Value};

#[tokio::test(flavor = "multi_thread")]
async fn test_connectivity_passes() {
    let api = MockIronApi::start().await;
    api.expect_request("/Login", Value::Null, json!({})).await;
    let ctx = TestContext::new().with_asset(&api.base_url(), "");

    ctx.command()
        .arg("test-connectivity")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "✓ test_connectivity: Test Connectivity to IronAPI Passed",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_action_exits_one() {
    let api = MockIronApi::start().await;
    api.respond_json("/Login", 401, json!({"error": "bad credentials"})).await;
    let ctx = TestContext::new().with_asset(&api.base_url(), "");

    let output = ctx.command().arg("test-connectivity").output().unwrap();
    output.assert_exit_code(1);
    output.assert_stdout_contains("✗ test_connectivity: Test Connectivity to IronAPI Failed");
}

#[test]
fn test_missing_asset_file_is_config_error() {
    let ctx = TestContext::new();

    ctx.command()
        .arg("test-connectivity")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_incomplete_asset_is_config_error() {
    let ctx = TestContext::new().with_config("base_url: http://127.0.0.1:1\n");

    ctx.command().arg("test-connectivity").assert().code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_alerts_json_output() {
    let api = MockIronApi::start().await;
    api.expect_request(
        "/GetAlerts",
        json!({
            "category": ["C2"],
            "severity": {"lower_bound": 500, "upper_bound": 1000},
        }),
        json!({"alerts": [alert("a-1", "C2", "BEACON", 700)]}),
    )
    .await;
    let ctx = TestContext::new().with_asset(&api.base_url(), "");

    let output = ctx
        .command()
        .args(["get-alerts", "--category", "c2", "--min-severity", "500", "--format", "json"])
        .output()
        .unwrap();
    output.assert_success();

    let result = parse_output(&output.stdout);
    assert_status(&result, "success");
    assert_eq!(result["action"], "irondefense_get_alerts");
    assert_eq!(result["summary"]["total_alerts"], 1);
    assert_eq!(result["data"][0]["alerts"][0]["id"], "a-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_parameter_value_fails_the_action() {
    let api = MockIronApi::start().await;
    let ctx = TestContext::new().with_asset(&api.base_url(), "");

    let output = ctx
        .command()
        .args([
            "rate-alert",
            "--alert-id",
            "a-1",
            "--analyst-severity",
            "catastrophic",
            "--analyst-expectation",
            "expected",
        ])
        .output()
        .unwrap();

    output.assert_exit_code(1);
    output.assert_stdout_contains("Alert rating failed. Error:");
    output.assert_stdout_contains("catastrophic");
    assert!(api.received().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_action_file_with_several_parameters() {
    let api = MockIronApi::start().await;
    api.respond_json("/GetEvents", 200, json!({"events": []})).await;
    let ctx = TestContext::new().with_asset(&api.base_url(), "");
    let file = ctx.write(
        "action.json",
        r#"{
            "identifier": "irondefense_get_events",
            "parameters": [{"alert_id": "a-1"}, {"alert_id": "a-2"}]
        }"#,
    );

    let output = ctx
        .command()
        .arg("run")
        .arg(&file)
        .args(["--format", "json"])
        .output()
        .unwrap();
    output.assert_success();

    let results = parse_output(&output.stdout);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["parameter"]["alert_id"], "a-2");
    assert_eq!(results[0]["summary"]["total_events"], 0);
    assert_eq!(api.received_for("/GetEvents").await.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_action_file_config_replaces_asset_file() {
    let api = MockIronApi::start().await;
    api.expect_request("/GetEvent", json!({"event_id": "e-1"}), json!({"event": {"id": "e-1"}}))
        .await;
    let ctx = TestContext::new();
    let file = ctx.write(
        "action.json",
        &json!({
            "identifier": "irondefense_get_event",
            "parameters": [{"event_id": "e-1"}],
            "config": {
                "base_url": api.base_url(),
                "username": "soar",
                "password": "hunter2",
                "verify_server_cert": false,
            },
        })
        .to_string(),
    );

    ctx.command()
        .arg("run")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Retrieving event was successful"));
}

#[test]
fn test_run_unknown_identifier_is_validation_error() {
    let ctx = TestContext::new().with_asset("http://127.0.0.1:1", "");
    let file = ctx.write("action.json", r#"{"identifier": "irondefense_reboot"}"#);

    ctx.command()
        .arg("run")
        .arg(&file)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("unknown action identifier 'irondefense_reboot'"));
}

#[test]
fn test_run_missing_file_is_validation_error() {
    let ctx = TestContext::new().with_asset("http://127.0.0.1:1", "");

    ctx.command().args(["run", "nope.json"]).assert().code(5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_writes_records_and_state() {
    let api = MockIronApi::start().await;
    api.respond_json(
        "/GetAlertNotifications",
        200,
        json!({"alert_notifications": [
            alert_notification("ANA_ALERT_CREATED", alert("a-1", "C2", "DNS_TUNNELING", 700)),
        ]}),
    )
    .await;
    let ctx = TestContext::new().with_asset(
        &api.base_url(),
        "enable_alert_notifications: true\nalert_notification_actions: alert created\n",
    );

    ctx.command()
        .args(["--state", "state.json", "poll", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ on_poll: Polling notifications was successful"));

    let containers = std::fs::read_to_string(ctx.path().join("out/containers.jsonl")).unwrap();
    assert_eq!(containers.lines().count(), 1);
    assert!(containers.contains("C2/DNS_TUNNELING"));
    let artifacts = std::fs::read_to_string(ctx.path().join("out/artifacts.jsonl")).unwrap();
    assert_eq!(artifacts.lines().count(), 1);

    let state: Value =
        serde_json::from_str(&std::fs::read_to_string(ctx.path().join("state.json")).unwrap())
            .unwrap();
    assert!(state["last_poll"].is_string());

    // A second poll of the same notification stores nothing new.
    ctx.command()
        .args(["--state", "state.json", "poll", "--output-dir", "out"])
        .assert()
        .success();
    let containers = std::fs::read_to_string(ctx.path().join("out/containers.jsonl")).unwrap();
    assert_eq!(containers.lines().count(), 1);
}

#[test]
fn test_unreachable_server_fails_the_action() {
    let ctx = TestContext::new().with_asset("http://127.0.0.1:1", "");

    ctx.command()
        .args(["get-event", "--event-id", "e-1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Retrieving event failed. Error:"));
}
