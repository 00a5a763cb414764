//! IronAPI request issuer.

use crate::error::ConnectorError;
use irondefense_common_config::ConnectorSettings;
use irondefense_common_http::{classify_response, join_url, BasicAuth, HttpClient, HttpConfig};
use irondefense_common_log::spans::request_span;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, Instrument};

/// Path every IronAPI endpoint lives under.
pub const API_ROOT: &str = "/IronApi";

/// Authenticated IronAPI client.
pub struct IronApiClient {
    http: HttpClient,
    api_url: String,
    auth: BasicAuth,
}

impl IronApiClient {
    /// Build a client from normalised settings.
    pub fn new(settings: &ConnectorSettings) -> Result<Self, ConnectorError> {
        let http = HttpClient::with_config(
            HttpConfig::default().verify_server_cert(settings.verify_server_cert),
        )?;
        Ok(Self {
            http,
            api_url: join_url(&settings.base_url, API_ROOT),
            auth: BasicAuth::new(settings.username.clone(), settings.password.clone()),
        })
    }

    /// Full URL for `endpoint` (`/Login`, `/RateAlert`, ...).
    pub fn url(&self, endpoint: &str) -> String {
        join_url(&self.api_url, endpoint)
    }

    /// POST `body` to `endpoint` and return the classified JSON.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Value, ConnectorError> {
        let url = self.url(endpoint);
        async {
            info!("Issuing POST request on {}", url);
            let response = self.http.post_json(&url, Some(&self.auth), body).await?;
            debug!(
                status = response.status,
                headers = ?response.headers,
                "Classifying response"
            );
            Ok::<_, ConnectorError>(classify_response(&response)?)
        }
        .instrument(request_span(endpoint))
        .await
    }
}
