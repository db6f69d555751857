mod error;
mod extractors;
mod handlers;
mod routes;
pub mod security;
mod state;

pub use error::{ApiError, AppResult};
pub use extractors::request_token;
pub use state::AppState;

use crate::{Config, Database};
use anyhow::Result;
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builds the full application router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let media = ServeDir::new(&state.media_dir);
    let media_prefix = state.media_prefix().to_string();
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .merge(routes::posting_routes())
        .merge(routes::tag_routes())
        .merge(routes::step_routes(state.max_upload_bytes))
        .merge(routes::health_routes())
        .nest_service(&media_prefix, media)
        .fallback(not_found)
        .layer(middleware::from_fn(security::apply_security_headers))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn serve(config: Config, db: Database, addr: &str) -> Result<()> {
    let state = Arc::new(AppState::new(config, db)?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
