use anyhow::{Context, Result};
use tracing::{info, warn};

use character_chat_relay::app_state::build_app_state;
use character_chat_relay::core::config::relay_config::RelayConfig;
use character_chat_relay::core::config::server_config::ServerConfig;
use character_chat_relay::core::logging::init_logging;
use character_chat_relay::routes::app_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let server_config = ServerConfig::from_env()?;
    let _log_guard = init_logging(&server_config);

    let relay_config = RelayConfig::from_env()?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        upstream = %relay_config.upstream_url,
        model = %relay_config.default_model,
        api_key = relay_config.masked_api_key().as_deref().unwrap_or("<missing>"),
        "relay configured"
    );
    if relay_config.api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; /chat and /generate-title will answer 500");
    }

    let state = build_app_state(relay_config)?;
    let app = app_router(state, server_config.body_limit_bytes);

    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
