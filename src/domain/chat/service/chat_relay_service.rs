use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::client::stream_forwarder::forward_stream;
use crate::core::client::upstream_client::UpstreamClient;
use crate::core::config::normalize_string;
use crate::core::config::relay_config::RelayConfig;
use crate::domain::chat::dto::chat_request::HistoryEntry;
use crate::domain::chat::dto::title_request::TitleResponse;
use crate::domain::chat::dto::upstream_request::{
    CanonicalMessage, CompletionResponse, UpstreamRequest,
};
use crate::domain::chat::service::chat_title_service::build_title_request;
use crate::errors::AppError;

const EVENT_STREAM: &str = "text/event-stream";

/// Forwards normalized conversations to the upstream provider.
///
/// Stateless between calls; the only shared pieces are the immutable
/// config and the pooled HTTP client.
pub struct ChatRelayService {
    client: UpstreamClient,
}

impl ChatRelayService {
    pub fn new(config: RelayConfig) -> Result<Self> {
        Ok(Self {
            client: UpstreamClient::new(Arc::new(config))?,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        self.client.config()
    }

    /// Chat mode: stream the completion back as it is generated.
    ///
    /// On success the returned response mirrors the upstream status and its
    /// body is fed incrementally. A non-success upstream answer is returned
    /// as [`AppError::Upstream`] carrying the exact status and bytes.
    pub async fn stream_chat(
        &self,
        messages: Vec<CanonicalMessage>,
        temperature: Option<f64>,
        model_name: Option<String>,
    ) -> Result<Response, AppError> {
        let span = info_span!("relay", request_id = %Uuid::new_v4(), mode = "chat");

        async move {
            let api_key = self.client.api_key()?;
            let config = self.client.config();

            let body = UpstreamRequest {
                model: model_name
                    .and_then(normalize_string)
                    .unwrap_or_else(|| config.default_model.clone()),
                messages,
                temperature: temperature.unwrap_or(config.default_temperature),
                stream: true,
                max_tokens: None,
            };

            let upstream = self.client.send(api_key, &body).await?;
            let status = upstream.status();

            if !status.is_success() {
                let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
                let bytes = upstream.bytes().await.map_err(|e| {
                    AppError::UpstreamFailed(format!("Failed to read upstream error body: {}", e))
                })?;
                warn!(
                    status = status.as_u16(),
                    body = %String::from_utf8_lossy(&bytes),
                    "upstream rejected chat request"
                );
                return Err(AppError::Upstream {
                    status,
                    content_type,
                    body: bytes,
                });
            }

            info!(status = status.as_u16(), model = %body.model, "streaming upstream response");

            let mut response = Response::new(forward_stream(upstream, config.stream_buffer_chunks));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(EVENT_STREAM));
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Title mode: one buffered completion summarizing the history.
    pub async fn generate_title(&self, history: &[HistoryEntry]) -> Result<TitleResponse, AppError> {
        let span = info_span!("relay", request_id = %Uuid::new_v4(), mode = "title");

        async move {
            let request = build_title_request(self.client.config(), history)?;
            let api_key = self.client.api_key()?;

            let upstream = self.client.send(api_key, &request).await?;
            let status = upstream.status();

            if !status.is_success() {
                let reason = status.canonical_reason().unwrap_or("Unknown status");
                let text = upstream.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %text, "upstream rejected title request");
                return Err(AppError::UpstreamFailed(format!("Upstream API error: {}", reason)));
            }

            let completion: CompletionResponse = upstream.json().await.map_err(|e| {
                AppError::UpstreamFailed(format!("Failed to decode upstream completion: {}", e))
            })?;

            let title = completion
                .first_content()
                .map(str::trim)
                .ok_or_else(|| {
                    AppError::UpstreamFailed(format!(
                        "Upstream API error: no choices in completion ({})",
                        status.canonical_reason().unwrap_or("Unknown status")
                    ))
                })?
                .to_string();

            info!(title = %title, "generated conversation title");
            Ok(TitleResponse { title })
        }
        .instrument(span)
        .await
    }
}
