//! HTTP JSON API over the person registry.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - response envelopes and error-to-status mapping

mod handlers;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use color_eyre::eyre::{Result, WrapErr};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use kinship_core::{PersonRegistry, ServerConfig};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// Registry every handler delegates to.
    pub registry: Arc<PersonRegistry>,
}

// =============================================================================
// Router
// =============================================================================

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/persons",
            get(handlers::list_persons)
                .post(handlers::create_person)
                .delete(handlers::delete_all_persons),
        )
        .route(
            "/persons/{id}",
            get(handlers::get_person)
                .put(handlers::replace_person)
                .patch(handlers::patch_person)
                .delete(handlers::delete_person),
        )
        .route("/persons/{id}/parents", get(handlers::parents))
        .route("/persons/{id}/children", get(handlers::children))
        .route("/persons/{id}/tree", get(handlers::tree))
        .route(
            "/persons/{id}/isparentof/{child_id}",
            patch(handlers::add_edge).delete(handlers::remove_edge),
        )
        .route("/reorder", post(handlers::reorder))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

// =============================================================================
// Server Entry Point
// =============================================================================

/// Serves the API until Ctrl+C.
pub async fn start_server(registry: Arc<PersonRegistry>, config: &ServerConfig) -> Result<()> {
    let app = router(Arc::new(AppState { registry }));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", addr))?;

    info!(%addr, "kinship API listening");
    println!("Kinship API: http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
