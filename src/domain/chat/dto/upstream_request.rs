use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Assistant,
    User,
}

/// Role/content pair in the upstream chat-completion format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    pub role: MessageRole,
    pub content: String,
}

impl CanonicalMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body posted to the completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<CanonicalMessage>,
    pub temperature: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// The subset of a buffered completion the relay reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn streaming_request_omits_max_tokens() {
        let req = UpstreamRequest {
            model: "m".into(),
            messages: vec![CanonicalMessage::new(MessageRole::System, "persona")],
            temperature: 0.7,
            stream: true,
            max_tokens: None,
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "model": "m",
                "messages": [{ "role": "system", "content": "persona" }],
                "temperature": 0.7,
                "stream": true
            })
        );
    }

    #[test]
    fn completion_without_choices_has_no_content() {
        let resp: CompletionResponse = serde_json::from_value(json!({ "id": "x" })).unwrap();
        assert!(resp.first_content().is_none());

        let resp: CompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": " Titel " } }]
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some(" Titel "));
    }
}
