//! Relay HTTP Server.
//!
//! Mounts the relay handler on the configured route (all methods, so the
//! handler itself answers 405) plus a health probe.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    routing::{any, get},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::relay::{Relay, relay_handler};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub relay: Arc<Relay>,
}

/// Build the relay router.
pub fn build_router(state: GatewayState, relay_route: &str) -> Router {
    Router::new()
        .route(relay_route, any(relay_handler))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "shaman-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Starts the relay server and serves until the process is interrupted.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState, relay_route: &str) -> Result<()> {
    let upstream = state.relay.upstream_url().to_string();
    let app = build_router(state, relay_route);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind relay on {addr}"))?;
    info!(%addr, route = relay_route, %upstream, "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down relay");
        })
        .await?;

    Ok(())
}
