pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use hamming_core::Session;
use tower_http::cors::CorsLayer;

/// Room for multipart boundaries and part headers on top of the file cap.
pub const MULTIPART_SLACK: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
}

pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.session.max_file_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_SLACK);
    Router::new()
        .route("/", get(routes::index))
        .route("/file", get(routes::current).post(routes::upload))
        .route("/download/{artifact}", get(routes::download))
        .route("/preview", get(routes::preview))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
