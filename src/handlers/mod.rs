// ============================================================================
// HTTP handlers and route builders
// ============================================================================

pub mod analyses;
pub mod analyze;
pub mod recovery;

use axum::routing::{get, post};
use axum::Router;

use crate::app::AppState;

/// Routes under /api/analyze.
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/email", post(analyze::analyze_email))
        .route("/url", post(analyze::analyze_url))
        .route("/file", post(analyze::analyze_file))
}

/// Routes under /api/analyses.
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(analyses::list_analyses))
        .route("/{id}", get(analyses::get_analysis))
        .route("/{id}/events", get(analyses::get_analysis_events))
}

/// Routes under /api/recovery.
pub fn recovery_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(recovery::start_recovery))
        .route("/message", post(recovery::message_recovery))
}
