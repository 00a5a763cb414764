//! Test utilities for the IronDefense connector crates.
//!
//! [`MockIronApi`] stands in for an IronAPI deployment; the `fixtures`
//! functions build notification payloads shaped like the real feeds.

use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub mod fixtures;

/// Username every mock asset uses.
pub const TEST_USERNAME: &str = "soar";
/// Password every mock asset uses.
pub const TEST_PASSWORD: &str = "hunter2";
/// `Authorization` header for [`TEST_USERNAME`]:[`TEST_PASSWORD`].
pub const TEST_AUTH_HEADER: &str = "Basic c29hcjpodW50ZXIy";

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Minimal asset YAML pointing at `base_url`, with `extra` appended.
pub fn asset_yaml(base_url: &str, extra: &str) -> String {
    format!(
        "base_url: {base_url}\nusername: {TEST_USERNAME}\npassword: {TEST_PASSWORD}\nverify_server_cert: false\n{extra}"
    )
}

/// Mock IronAPI server. Endpoints are given without the `/IronApi` prefix.
pub struct MockIronApi {
    server: MockServer,
}

impl MockIronApi {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Value for the asset's `base_url`.
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Access the underlying MockServer.
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    fn api_path(endpoint: &str) -> String {
        format!("/IronApi{endpoint}")
    }

    /// Answer `endpoint` with a JSON body and status.
    pub async fn respond_json(&self, endpoint: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `endpoint` with JSON only when the request body equals `request`.
    /// Exactly one matching call is expected when the server drops.
    pub async fn expect_request(
        &self,
        endpoint: &str,
        request: serde_json::Value,
        response: serde_json::Value,
    ) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(endpoint)))
            .and(body_json(request))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer `endpoint` with an HTML page.
    pub async fn respond_html(&self, endpoint: &str, status: u16, html: &str) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(endpoint)))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_raw(html, "text/html"),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer `endpoint` with no body at all.
    pub async fn respond_empty(&self, endpoint: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(endpoint)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far.
    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received for `endpoint`.
    pub async fn received_for(&self, endpoint: &str) -> Vec<Request> {
        let wanted = Self::api_path(endpoint);
        self.received()
            .await
            .into_iter()
            .filter(|r| r.url.path() == wanted)
            .collect()
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
