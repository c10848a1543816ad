pub mod chat_normalize_service;
pub mod chat_relay_service;
pub mod chat_title_service;
