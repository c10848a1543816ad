use crate::domain::chat::dto::chat_request::{ChatRequest, HistoryEntry};
use crate::domain::chat::dto::upstream_request::{CanonicalMessage, MessageRole};
use crate::errors::AppError;

/// Rebuild the role-tagged message sequence the upstream model expects.
///
/// Output is always: one `system` message from the character description,
/// the truthy history turns in order, then the new `user` message.
pub fn normalize(request: &ChatRequest) -> Result<Vec<CanonicalMessage>, AppError> {
    let (character, user_message) = match (&request.character, &request.user_message) {
        (Some(character), Some(user_message)) => (character, user_message),
        _ => {
            return Err(AppError::Validation(
                "character and userMessage are required (userMessage may be empty)".into(),
            ))
        }
    };

    let mut messages = Vec::with_capacity(request.chat_history.len() + 2);
    messages.push(CanonicalMessage::new(
        MessageRole::System,
        character.description.as_str(),
    ));

    for entry in &request.chat_history {
        if let Some(text) = entry.text()? {
            messages.push(CanonicalMessage::new(role_for(entry), text));
        }
    }

    messages.push(CanonicalMessage::new(MessageRole::User, user_message.as_str()));
    Ok(messages)
}

fn role_for(entry: &HistoryEntry) -> MessageRole {
    if entry.is_ai() {
        MessageRole::Assistant
    } else {
        MessageRole::User
    }
}
