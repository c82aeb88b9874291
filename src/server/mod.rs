// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface for credential bindings and namespace deletion.

pub mod error;
pub mod handlers;

use crate::context::AppContext;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub use error::ApiError;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/create", post(handlers::create_binding))
        .route("/delete-fic", delete(handlers::delete_binding))
        .route("/delete-k8s", delete(handlers::delete_namespace))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(ctx)
}

pub async fn run(ctx: Arc<AppContext>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
