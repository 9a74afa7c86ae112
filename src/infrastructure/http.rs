use crate::config::ApiSettings;
use crate::domain::ports::ApiClient;
use crate::error::{CheckoutError, Result, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

const JSON_API: &str = "application/vnd.api+json";

/// `ApiClient` backed by `reqwest`.
///
/// Bodies are sent exactly as given. The client-level timeout bounds every
/// request so a hung server still resolves into a transport fault.
#[derive(Clone)]
pub struct HttpApiClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                CheckoutError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { settings, client })
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn post(&self, path: &str, body: Option<String>) -> std::result::Result<Value, TransportError> {
        let url = self.settings.url_for(path);
        debug!(%url, "POST");

        let mut request = self
            .client
            .post(&url)
            .header(ACCEPT, JSON_API)
            .header(CONTENT_TYPE, JSON_API);
        if let Some(token) = &self.settings.auth_token {
            request = request.header(AUTHORIZATION, format!("JWT {}", token));
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
