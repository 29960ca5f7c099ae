pub mod dashboard;
pub mod health;

#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::ingest::handlers as documents;
use crate::notifications::handlers as notifications;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/health", get(health::health_handler))
        // Documents
        .route("/api/stats", get(documents::handle_stats))
        .route("/api/documents", get(documents::handle_list_documents))
        .route("/api/documents/upload", post(documents::handle_upload))
        .route(
            "/api/documents/:id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        // Analyses
        .route("/api/analysis", post(analysis::handle_start_analysis))
        .route("/api/analyses", get(analysis::handle_list_analyses))
        .route("/api/analyses/:id", get(analysis::handle_get_analysis))
        .route(
            "/api/analyses/:analysis_id/candidates/:candidate_id/status",
            patch(analysis::handle_update_candidate_status),
        )
        .route("/api/reverse-match", post(analysis::handle_reverse_match))
        .route("/api/test-gemini", post(analysis::handle_test_gemini))
        // Notifications
        .route("/api/notifications", get(notifications::handle_list))
        .route(
            "/api/notifications/unread-count",
            get(notifications::handle_unread_count),
        )
        .route(
            "/api/notifications/read-all",
            put(notifications::handle_mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            put(notifications::handle_mark_read),
        )
        .route("/api/notifications/:id", delete(notifications::handle_delete))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
