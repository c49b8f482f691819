//! HTTP surface for doctext.
//!
//! `POST /extract-text` takes a multipart upload with a `file` field and
//! answers with the extracted text as JSON. `GET /health` is a liveness probe.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod models;
pub mod state;
pub mod upload;

pub use state::AppState;

/// Room left above the payload ceiling for multipart framing, so oversized
/// files up to this margin reach the dispatcher and get its size error.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.body_limit());

    Router::new()
        .route("/extract-text", post(handlers::extract::extract_text))
        .route("/health", get(handlers::health::health))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
