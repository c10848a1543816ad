use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::warn;
use validator::Validate;

use crate::app_state::AppState;
use crate::domain::chat::dto::chat_request::ChatRequest;
use crate::domain::chat::dto::title_request::{TitleRequest, TitleResponse};
use crate::domain::chat::service::chat_normalize_service::normalize;
use crate::errors::{AppError, PlainTextError};

pub struct ChatController;

impl ChatController {
    pub async fn chat(
        State(state): State<AppState>,
        payload: Result<Json<ChatRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(payload) = payload.map_err(rejection)?;
        let messages = normalize(&payload).inspect_err(log_failure)?;

        state
            .relay_service
            .stream_chat(messages, payload.temperature, payload.model_name)
            .await
            .inspect_err(log_failure)
    }

    pub async fn generate_title(
        State(state): State<AppState>,
        payload: Result<Json<TitleRequest>, JsonRejection>,
    ) -> Result<Json<TitleResponse>, PlainTextError> {
        let Json(payload) = payload.map_err(rejection)?;
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))
            .inspect_err(log_failure)?;

        let title = state
            .relay_service
            .generate_title(&payload.chat_history)
            .await
            .inspect_err(log_failure)?;

        Ok(Json(title))
    }
}

fn rejection(err: JsonRejection) -> AppError {
    let err = AppError::Validation(err.body_text());
    log_failure(&err);
    err
}

fn log_failure(err: &AppError) {
    match err {
        AppError::Validation(msg) => warn!(error = %msg, "rejected invalid request"),
        // already logged with the upstream body
        AppError::Upstream { .. } => {}
        other => tracing::error!(error = %other, "request failed"),
    }
}
