pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::analyze::handlers::handle_analyze;
use crate::analyze::MAX_RESUME_BYTES;
use crate::state::AppState;

/// Slack for multipart framing and the job-description field on top of the
/// 5 MB resume cap. Oversized files are still rejected per-field.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let static_site = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/analyze",
            post(handle_analyze).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + BODY_LIMIT_SLACK)),
        )
        .fallback_service(static_site)
        .with_state(state)
}
