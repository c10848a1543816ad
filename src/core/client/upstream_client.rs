use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::debug;

use crate::core::config::relay_config::RelayConfig;
use crate::domain::chat::dto::upstream_request::UpstreamRequest;
use crate::errors::AppError;

const HTTP_REFERER: HeaderName = HeaderName::from_static("http-referer");
const X_TITLE: HeaderName = HeaderName::from_static("x-title");

/// Thin wrapper over a shared reqwest client bound to one completions endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: Arc<RelayConfig>,
}

impl UpstreamClient {
    pub fn new(config: Arc<RelayConfig>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .default_headers(attribution_headers(&config)?)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Fails with a configuration error before any network activity when no key is set.
    pub fn api_key(&self) -> Result<&str, AppError> {
        self.config.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "Upstream API key is not configured; set OPENROUTER_API_KEY".into(),
            )
        })
    }

    /// POST the completion request and return the raw response, whatever its status.
    pub async fn send(&self, api_key: &str, body: &UpstreamRequest) -> Result<Response, AppError> {
        debug!(
            url = %self.config.upstream_url,
            model = %body.model,
            stream = body.stream,
            messages = body.messages.len(),
            "sending upstream completion request"
        );

        self.client
            .post(&self.config.upstream_url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamFailed(format!(
                    "Failed to reach upstream (url={}): {}",
                    self.config.upstream_url, e
                ))
            })
    }
}

fn attribution_headers(config: &RelayConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(referer) = &config.http_referer {
        headers.insert(
            HTTP_REFERER,
            HeaderValue::from_str(referer).context("Invalid RELAY_HTTP_REFERER header value")?,
        );
    }
    if let Some(title) = &config.app_title {
        headers.insert(
            X_TITLE,
            HeaderValue::from_str(title).context("Invalid RELAY_APP_TITLE header value")?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let client = UpstreamClient::new(Arc::new(RelayConfig::default())).unwrap();
        assert!(matches!(client.api_key(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn attribution_headers_follow_config() {
        let config = RelayConfig {
            http_referer: Some("https://chat.example.com".into()),
            app_title: None,
            ..RelayConfig::default()
        };
        let headers = attribution_headers(&config).unwrap();
        assert_eq!(headers.get("http-referer").unwrap(), "https://chat.example.com");
        assert!(headers.get("x-title").is_none());
    }

    #[test]
    fn non_ascii_header_value_is_rejected() {
        let config = RelayConfig {
            app_title: Some("line\nbreak".into()),
            ..RelayConfig::default()
        };
        assert!(UpstreamClient::new(Arc::new(config)).is_err());
    }
}
