//! HTTP relay between a character-chat client and an upstream
//! chat-completion provider.

pub mod api;
pub mod app_state;
pub mod core;
pub mod domain;
pub mod errors;
pub mod routes;
