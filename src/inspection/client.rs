//! Search Console URL-inspection client
//!
//! This module handles the HTTP side of an inspection:
//! - Building the HTTP client with timeouts and a user agent
//! - Sending one `index:inspect` request per URL
//! - Normalizing success, API errors and transport failures into an
//!   `InspectionResult`
//!
//! There is no retry; every call makes exactly one attempt.

use crate::config::InspectorConfig;
use crate::inspection::credentials::TokenProvider;
use crate::inspection::types::{IndexStatus, InspectionResult};
use crate::inspection::Inspector;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Path of the inspect method below the API root
pub const INSPECT_PATH: &str = "/v1/urlInspection/index:inspect";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectRequest<'a> {
    inspection_url: &'a str,
    site_url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectResponse {
    #[serde(default)]
    inspection_result: Option<InspectionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectionPayload {
    #[serde(default)]
    index_status_result: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Builds an HTTP client for the inspection API
///
/// # Example
///
/// ```no_run
/// use sumi_inspect::config::InspectorConfig;
/// use sumi_inspect::inspection::build_http_client;
///
/// let client = build_http_client(&InspectorConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &InspectorConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("sumi-inspect/{}", env!("CARGO_PKG_VERSION")));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Inspector backed by the Search Console URL Inspection API
pub struct SearchConsoleInspector {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SearchConsoleInspector {
    /// Creates an inspector from configuration
    pub fn new(
        config: &InspectorConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, &config.api_endpoint, tokens))
    }

    /// Creates an inspector around an existing HTTP client
    pub fn with_client(client: Client, api_endpoint: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            endpoint: inspect_endpoint(api_endpoint),
            tokens,
        }
    }

    /// The full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_inspect(&self, url: &str, site_url: &str) -> Result<IndexStatus, String> {
        let token = self.tokens.access_token().await.map_err(|e| e.to_string())?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&InspectRequest {
                inspection_url: url,
                site_url,
            })
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error_message(status.as_u16(), &body));
        }

        let payload: InspectResponse = response
            .json()
            .await
            .map_err(|e| format!("Malformed response: {}", e))?;

        payload
            .inspection_result
            .and_then(|r| r.index_status_result)
            .ok_or_else(|| "Malformed response: missing indexStatusResult".to_string())
    }
}

#[async_trait]
impl Inspector for SearchConsoleInspector {
    async fn inspect(&self, url: &str, site_url: &str) -> InspectionResult {
        match self.try_inspect(url, site_url).await {
            Ok(status) => InspectionResult::success(url, status),
            Err(message) => {
                tracing::debug!("Inspection of {} failed: {}", url, message);
                InspectionResult::error(url, message)
            }
        }
    }
}

/// Joins the API root and the inspect path
fn inspect_endpoint(api_endpoint: &str) -> String {
    format!("{}{}", api_endpoint.trim_end_matches('/'), INSPECT_PATH)
}

/// Extracts the human-readable message from an API error body
fn api_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn classify_transport_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::StaticToken;

    #[test]
    fn test_inspect_endpoint_joins_path() {
        assert_eq!(
            inspect_endpoint("https://searchconsole.googleapis.com"),
            "https://searchconsole.googleapis.com/v1/urlInspection/index:inspect"
        );
        assert_eq!(
            inspect_endpoint("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000/v1/urlInspection/index:inspect"
        );
    }

    #[test]
    fn test_api_error_message_from_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for quota metric","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(429, body), "Quota exceeded for quota metric");
    }

    #[test]
    fn test_api_error_message_fallback() {
        assert_eq!(api_error_message(502, "<html>Bad gateway</html>"), "HTTP 502");
        assert_eq!(api_error_message(403, r#"{"error":{"message":""}}"#), "HTTP 403");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(InspectRequest {
            inspection_url: "https://x.com/a",
            site_url: "https://x.com/",
        })
        .unwrap();
        assert_eq!(body["inspectionUrl"], "https://x.com/a");
        assert_eq!(body["siteUrl"], "https://x.com/");
    }

    #[test]
    fn test_build_inspector() {
        let inspector =
            SearchConsoleInspector::new(&InspectorConfig::default(), Arc::new(StaticToken::new("t")));
        assert!(inspector.is_ok());
        assert!(inspector.unwrap().endpoint().ends_with(INSPECT_PATH));
    }
}
