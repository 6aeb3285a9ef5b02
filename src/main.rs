//! Countdown - A drift-free countdown timer served over HTTP
//!
//! This is the main entry point for the countdown application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use countdown::{
    api::create_router,
    config::Config,
    services::FileStore,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, store={}",
          config.host, config.port, config.tick_ms, config.store.display());

    // Create application state and the timer task
    let store = Box::new(FileStore::new(&config.store));
    let (state, timer_task) = AppState::new(
        config.port,
        config.host.clone(),
        store,
        config.tick_interval(),
    );
    let state = Arc::new(state);

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start    - Start the countdown");
    info!("  POST /timer/pause    - Pause the countdown");
    info!("  POST /timer/resume   - Resume the countdown");
    info!("  POST /timer/reset    - Reset to idle");
    info!("  PUT  /timer/duration - Set the duration while idle");
    info!("  GET  /timer          - Current timer view");
    info!("  GET  /timer/events   - Timer view stream (SSE)");
    info!("  GET  /status         - Timer and server status");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop the timer task so no tick outlives the server
    if let Err(e) = state.timer.shutdown().await {
        tracing::warn!("Timer task already stopped: {}", e);
    }
    timer_task.await.context("Timer task panicked")?;

    info!("Server shutdown complete");
    Ok(())
}
