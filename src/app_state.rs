use std::sync::Arc;

use anyhow::Result;

use crate::core::config::relay_config::RelayConfig;
use crate::domain::chat::service::chat_relay_service::ChatRelayService;

#[derive(Clone)]
pub struct AppState {
    pub relay_service: Arc<ChatRelayService>,
}

pub fn build_app_state(config: RelayConfig) -> Result<AppState> {
    Ok(AppState {
        relay_service: Arc::new(ChatRelayService::new(config)?),
    })
}
