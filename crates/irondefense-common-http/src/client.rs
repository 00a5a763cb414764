//! HTTP client configuration.

use crate::request::{headers, BasicAuth};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;

/// Detail used when a transport error carries no message.
pub const UNKNOWN_ERROR_DETAILS: &str =
    "Unknown error occurred. Please check the asset configuration parameters.";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Verify the server's TLS certificate.
    pub verify_server_cert: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("irondefense-connector/{}", env!("CARGO_PKG_VERSION")),
            verify_server_cert: true,
        }
    }
}

impl HttpConfig {
    /// Set certificate verification.
    pub fn verify_server_cert(mut self, verify: bool) -> Self {
        self.verify_server_cert = verify;
        self
    }
}

/// Build a configured HTTP client.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .danger_accept_invalid_certs(!config.verify_server_cert)
        .gzip(true)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Error Connecting to server. Details: {details}")]
    Connect { details: String },

    #[error("failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        let details = e.to_string();
        HttpError::Connect {
            details: if details.trim().is_empty() {
                UNKNOWN_ERROR_DETAILS.to_string()
            } else {
                details
            },
        }
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header, empty when absent.
    pub content_type: String,
    /// All headers, for debug output.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    fn header_pairs(map: &HeaderMap) -> Vec<(String, String)> {
        map.iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

/// HTTP client for IronAPI calls.
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default config.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HTTP client with custom config.
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        let inner = build_client(&config)?;
        Ok(Self { inner })
    }

    /// POST `body` as JSON and read the whole response.
    ///
    /// Non-2xx statuses are not errors here; [`crate::classify_response`]
    /// decides what they mean.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        auth: Option<&BasicAuth>,
        body: &T,
    ) -> Result<HttpResponse, HttpError> {
        let payload = serde_json::to_vec(body)?;
        tracing::debug!(url = %url, body = %String::from_utf8_lossy(&payload), "POST");

        let mut request = self
            .inner
            .post(url)
            .header(CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
            .body(payload);
        if let Some(auth) = auth {
            request = request.basic_auth(&auth.username, Some(auth.password.expose()));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = HttpResponse::header_pairs(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        tracing::debug!(status, content_type = %content_type, body = %body, "Received response");
        Ok(HttpResponse {
            status,
            content_type,
            headers,
            body,
        })
    }
}
