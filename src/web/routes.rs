use super::handlers;
use super::state::AppState;
use crate::models::{Step, Tag};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn posting_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/postings/",
            get(handlers::postings::list).post(handlers::postings::create),
        )
        .route(
            "/postings/:id/",
            get(handlers::postings::retrieve)
                .put(handlers::postings::replace)
                .patch(handlers::postings::partial_update)
                .delete(handlers::postings::destroy),
        )
}

pub fn tag_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/tags/",
            get(handlers::attrs::list::<Tag>).post(handlers::attrs::create::<Tag>),
        )
        .route(
            "/tags/:id/",
            get(handlers::attrs::retrieve::<Tag>)
                .put(handlers::attrs::replace::<Tag>)
                .patch(handlers::attrs::partial_update::<Tag>)
                .delete(handlers::attrs::destroy::<Tag>),
        )
}

pub fn step_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/steps/",
            get(handlers::attrs::list::<Step>).post(handlers::attrs::create::<Step>),
        )
        .route(
            "/steps/:id/",
            get(handlers::attrs::retrieve::<Step>)
                .put(handlers::attrs::replace::<Step>)
                .patch(handlers::attrs::partial_update::<Step>)
                .delete(handlers::attrs::destroy::<Step>),
        )
        .route(
            "/steps/:id/upload_image/",
            post(handlers::steps::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health))
}
