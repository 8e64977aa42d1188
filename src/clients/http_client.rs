//! HTTP client for remote API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the remote accounting API. The client is a thin transport:
//! it builds URLs, attaches default headers, executes one request, and
//! parses the response. Retry and backoff policy deliberately live outside
//! this crate.

use std::collections::HashMap;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::config::SyncConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the remote accounting API.
///
/// The client handles:
/// - Base URI construction from configuration
/// - Default headers including User-Agent, Accept and bearer token
/// - Response body parsing (JSON)
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async
/// tasks, though the engine itself never issues concurrent requests.
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URI (e.g., `https://api.xero.com`).
    base_uri: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        let base_uri = config.base_url().as_ref().to_string();

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Ledger Sync Library v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", config.access_token().as_ref()),
        );

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_uri,
            default_headers,
        }
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the remote API.
    ///
    /// This method handles request validation, URL construction, header
    /// merging, and response parsing. Exactly one request is issued; a
    /// non-2xx status is returned as [`HttpError::Response`] with the raw
    /// body preserved for inspection.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - A network error occurs (`Network`)
    /// - A non-2xx response is received (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}/{}", self.base_uri, request.path);

        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }

        let mut req_builder = match request.http_method {
            crate::clients::http_request::HttpMethod::Get => self.client.get(&url),
            crate::clients::http_request::HttpMethod::Post => self.client.post(&url),
            crate::clients::http_request::HttpMethod::Put => self.client.put(&url),
            crate::clients::http_request::HttpMethod::Delete => self.client.delete(&url),
        };

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        tracing::debug!(method = %request.http_method, path = %request.path, "dispatching request");

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        if code < 200 || code >= 300 {
            return Err(HttpError::Response(HttpResponseError {
                code,
                message: body_text,
            }));
        }

        let body = if body_text.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&body_text).unwrap_or_else(|_| serde_json::json!({}))
        };

        Ok(HttpResponse::new(code, res_headers, body))
    }

    /// Converts reqwest headers into a plain map with lowercase keys.
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();

        for (name, value) in headers {
            if let Ok(value_str) = value.to_str() {
                result
                    .entry(name.as_str().to_lowercase())
                    .or_default()
                    .push(value_str.to_string());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessToken, ApiBaseUrl};

    fn create_test_config() -> SyncConfig {
        SyncConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
            .access_token(AccessToken::new("test-token").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_uses_configured_base_uri() {
        let client = HttpClient::new(&create_test_config());
        assert_eq!(client.base_uri(), "https://api.example.com");
    }

    #[test]
    fn test_client_sets_bearer_token_header() {
        let client = HttpClient::new(&create_test_config());
        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Bearer test-token".to_string())
        );
    }

    #[test]
    fn test_client_requests_json_responses() {
        let client = HttpClient::new(&create_test_config());
        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_user_agent_includes_prefix_when_configured() {
        let config = SyncConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
            .access_token(AccessToken::new("test-token").unwrap())
            .user_agent_prefix("MyApp")
            .build()
            .unwrap();

        let client = HttpClient::new(&config);
        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp | "));
    }
}
