use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    /// Non-success answer from the upstream provider, forwarded untouched.
    #[error("Upstream returned {status}")]
    Upstream {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },

    #[error("{0}")]
    UpstreamFailed(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { status, .. } => *status,
            AppError::UpstreamFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn verbatim(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Response {
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        if let Some(ct) = content_type {
            response.headers_mut().insert(header::CONTENT_TYPE, ct);
        }
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Upstream { status, content_type, body } => {
                Self::verbatim(status, content_type, body)
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

/// Renders an [`AppError`] as `text/plain` instead of a JSON envelope.
#[derive(Debug)]
pub struct PlainTextError(pub AppError);

impl From<AppError> for PlainTextError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PlainTextError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        match self.0 {
            AppError::Upstream { status, content_type, body } => {
                AppError::verbatim(status, content_type, body)
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
