//! Chat Room Server Library
//!
//! Poll-based chat room with heartbeat presence: participants register, post
//! broadcast or directed messages, read the messages visible to them, and are
//! evicted after going quiet.

pub mod chat;
pub mod core;

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::chat::PresenceMonitor;
use crate::core::store::ChatStore;
use crate::core::{AppState, ChatServerConfig};

/// Full HTTP application for `state`
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(crate::core::router())
        .merge(crate::chat::router())
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Chat Server ===");

    let config = ChatServerConfig::from_env();

    let store = Arc::new(ChatStore::connect(&config.database_url).await?);
    info!("Store initialized");

    let monitor = PresenceMonitor::start(store.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = app(AppState::new(store.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    monitor.stop().await;
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
