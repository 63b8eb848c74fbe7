pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/analyze", post(handlers::handle_match_analysis))
        .route("/analyze-jd", post(handlers::handle_jd_analysis))
        .route("/check-ats", post(handlers::handle_ats_check))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
