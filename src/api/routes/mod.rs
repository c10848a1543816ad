//! API route declarations

pub mod chat_routes;
