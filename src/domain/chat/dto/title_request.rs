use serde::{Deserialize, Serialize};
use validator::Validate;

use super::chat_request::{null_as_empty, HistoryEntry};

/// Inbound `/generate-title` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TitleRequest {
    #[validate(length(min = 1, message = "chatHistory must contain at least one entry"))]
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleResponse {
    pub title: String,
}
