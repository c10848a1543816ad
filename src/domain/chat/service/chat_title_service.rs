use crate::core::config::relay_config::RelayConfig;
use crate::domain::chat::dto::chat_request::HistoryEntry;
use crate::domain::chat::dto::upstream_request::{CanonicalMessage, MessageRole, UpstreamRequest};
use crate::errors::AppError;

fn title_instruction(language: &str) -> String {
    format!(
        "You summarize conversations. Reply with a short title of at most five words in {language} \
         describing the topic of the conversation. Output only the title: plain text, no quotes, \
         no trailing punctuation."
    )
}

/// `"<sender>: <main>"` per entry, newline-joined, in order.
pub fn transcript(history: &[HistoryEntry]) -> Result<String, AppError> {
    if history.is_empty() {
        return Err(AppError::Validation(
            "chatHistory must contain at least one entry".into(),
        ));
    }

    let lines = history
        .iter()
        .map(|entry| -> Result<String, AppError> {
            let text = entry.text()?.unwrap_or_default();
            Ok(format!("{}: {}", entry.sender_label(), text))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

/// Non-streaming request asking the model for a conversation title.
pub fn build_title_request(
    config: &RelayConfig,
    history: &[HistoryEntry],
) -> Result<UpstreamRequest, AppError> {
    let transcript = transcript(history)?;

    Ok(UpstreamRequest {
        model: config.default_model.clone(),
        messages: vec![
            CanonicalMessage::new(MessageRole::System, title_instruction(&config.title_language)),
            CanonicalMessage::new(MessageRole::User, transcript),
        ],
        temperature: config.title_temperature,
        stream: false,
        max_tokens: Some(config.title_max_tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn history(value: serde_json::Value) -> Vec<HistoryEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn transcript_keeps_order_and_senders() {
        let h = history(json!([
            { "sender": "user", "main": "Hallo" },
            { "sender": "ai", "main": "Hi!" },
            { "main": "no sender" },
            { "sender": "ai", "main": "" }
        ]));

        assert_eq!(
            transcript(&h).unwrap(),
            "user: Hallo\nai: Hi!\nuser: no sender\nai: "
        );
    }

    #[test]
    fn empty_history_is_rejected() {
        assert!(matches!(transcript(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn title_request_is_small_and_buffered() {
        let config = RelayConfig {
            title_language: "French".into(),
            ..RelayConfig::default()
        };
        let h = history(json!([{ "sender": "user", "main": "Bonjour" }]));

        let req = build_title_request(&config, &h).unwrap();
        assert!(!req.stream);
        assert_eq!(req.max_tokens, Some(20));
        assert_eq!(req.temperature, 0.5);
        assert_eq!(req.model, config.default_model);
        assert_eq!(req.messages[0].role, MessageRole::System);
        assert!(req.messages[0].content.contains("French"));
        assert_eq!(req.messages[1].content, "user: Bonjour");
    }
}
