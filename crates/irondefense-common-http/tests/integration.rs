use irondefense_common_http::{classify_response, HttpClient, HttpConfig, HttpError, ResponseError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post(server: &MockServer, endpoint: &str) -> Result<serde_json::Value, String> {
    let client = HttpClient::new().expect("client");
    let response = client
        .post_json(&format!("{}{}", server.uri(), endpoint), None, &json!({"limit": 1}))
        .await
        .map_err(|e| e.to_string())?;
    classify_response(&response).map_err(|e| e.to_string())
}

#[tokio::test]
async fn test_json_roundtrip_through_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/IronApi/GetAlerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"alerts": [{"id": "a-1"}]})))
        .mount(&server)
        .await;

    let value = post(&server, "/IronApi/GetAlerts").await.unwrap();
    assert_eq!(value["alerts"][0]["id"], "a-1");
}

#[tokio::test]
async fn test_proxy_html_page_becomes_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(407)
                .set_body_raw("<html><body><h1>Proxy Authentication Required</h1></body></html>", "text/html; charset=UTF-8"),
        )
        .mount(&server)
        .await;

    let err = post(&server, "/IronApi/Login").await.unwrap_err();
    assert_eq!(
        err,
        "Status Code: 407. Data from server:\nProxy Authentication Required\n"
    );
}

#[tokio::test]
async fn test_server_error_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw(r#"{"code":13,"message":"internal"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = post(&server, "/IronApi/GetEvent").await.unwrap_err();
    assert!(err.starts_with("Error from server. Status Code: 500"));
    assert!(err.contains(r#""message":"internal""#));
}

#[test]
fn test_default_config_values() {
    let config = HttpConfig::default();
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert!(config.verify_server_cert);
}

#[test]
fn test_error_display() {
    let connect = HttpError::Connect {
        details: "connection refused".to_string(),
    };
    assert_eq!(
        connect.to_string(),
        "Error Connecting to server. Details: connection refused"
    );

    let empty = ResponseError::Empty { status: 500 };
    assert_eq!(empty.status(), Some(500));
}
