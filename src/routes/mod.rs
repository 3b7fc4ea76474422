mod api;

pub use api::*;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route("/api/assignments/:assignment_id", get(get_assignment))
        .route(
            "/api/assignments/:assignment_id/submissions",
            get(assignment_submissions),
        )
        .route("/api/submissions", post(create_submission))
        .route(
            "/api/submissions/:submission_id",
            get(get_submission).delete(confirm_delete_submission),
        )
        .route("/api/submissions/:submission_id/result", put(mark_submission))
        .route(
            "/api/submissions/:submission_id/delete-request",
            post(request_delete_submission),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
