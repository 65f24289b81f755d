//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the backends:
//! - Building the shared HTTP client with the configured headers
//! - GET requests returning text or decoded JSON
//! - Classifying failures into the `FetchError` taxonomy
//!
//! There is no retry logic: every failure is final for its unit of work.

use crate::config::HttpConfig;
use crate::{ConfigError, FetchError, FetchResult, HarvestError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
/// * `api_key` - Optional bearer token sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use story_harvest::config::HttpConfig;
/// use story_harvest::source::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, api_key: Option<&str>) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();

    let language = HeaderValue::from_str(&config.accept_language).map_err(|e| {
        ConfigError::Validation(format!("Invalid accept-language header: {}", e))
    })?;
    headers.insert(ACCEPT_LANGUAGE, language);

    if let Some(key) = api_key {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|e| ConfigError::Validation(format!("Invalid api-key: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches a URL and returns the response body
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `FetchError::Status` |
/// | Timeout | `FetchError::Transport` ("Request timeout") |
/// | Connection refused / DNS | `FetchError::Transport` ("Connection refused") |
/// | Body read failure | `FetchError::Transport` |
pub async fn fetch_text(client: &Client, url: &str) -> FetchResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| transport_error(url, &e))
}

/// Fetches a URL and decodes the body as JSON
///
/// A body that is not valid JSON for `T` is an `Extraction` failure.
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> FetchResult<T> {
    let body = fetch_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Extraction {
        url: url.to_string(),
        message: format!("Invalid JSON: {}", e),
    })
}

fn transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
