pub mod chat_request;
pub mod title_request;
pub mod upstream_request;
