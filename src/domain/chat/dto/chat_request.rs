use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::errors::AppError;

/// Persona supplied with every request. Only `description` is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `"ai"` for model turns; anything else is the human user.
    #[serde(default)]
    pub sender: Option<String>,
    /// Raw turn text. Kept untyped so falsy and non-string values can be told apart.
    #[serde(default)]
    pub main: Option<Value>,
}

impl HistoryEntry {
    pub fn is_ai(&self) -> bool {
        self.sender.as_deref() == Some("ai")
    }

    pub fn sender_label(&self) -> &str {
        self.sender.as_deref().unwrap_or("user")
    }

    /// Text of the turn, `None` when `main` is JSON-falsy.
    ///
    /// A truthy value that is not a string is rejected rather than coerced.
    pub fn text(&self) -> Result<Option<&str>, AppError> {
        match &self.main {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
            Some(other) => Err(AppError::Validation(format!(
                "chatHistory entry has a non-string main field: {}",
                other
            ))),
        }
    }
}

/// Inbound `/chat` payload.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub character: Option<Character>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub chat_history: Vec<HistoryEntry>,

    /// Absent and `null` are both "not supplied"; `""` is a valid message.
    pub user_message: Option<String>,

    /// Accepts `0.9` as well as `"0.9"`.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub temperature: Option<f64>,

    pub model_name: Option<String>,
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}
