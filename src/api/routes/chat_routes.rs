use axum::{routing::post, Router};

use crate::api::controller::chat::ChatController;
use crate::app_state::AppState;

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(ChatController::chat))
        .route("/generate-title", post(ChatController::generate_title))
}
