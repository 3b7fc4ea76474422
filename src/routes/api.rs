use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{GradeResult, NewAssignment, NewSubmission};
use crate::error::ServiceError;
use crate::state::AppState;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

// Malformed, mistyped, or non-JSON bodies get the same error shape as
// every other failure.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::validation("body", rejection.body_text())
    }
}

pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAssignment>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(new) = payload?;
    let assignment = state.service.create_assignment(new).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.service.list_assignments().await?))
}

pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.service.get_assignment(&assignment_id).await?))
}

pub async fn assignment_submissions(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let submissions = state
        .service
        .query_submissions_by_assignment(&assignment_id)
        .await?;
    Ok(Json(submissions))
}

pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(new) = payload?;
    let submission = state.service.create_submission(new).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.service.get_submission(&submission_id).await?))
}

#[derive(Deserialize)]
pub struct MarkRequest {
    #[serde(default)]
    result: Option<String>,
}

pub async fn mark_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
    payload: Result<Json<MarkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(body) = payload?;
    let result: GradeResult = body
        .result
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e| ServiceError::validation("result", format!("{e}")))?;
    let submission = state.service.mark_submission(&submission_id, result).await?;
    Ok(Json(submission))
}

pub async fn request_delete_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let intent = state
        .service
        .request_delete_submission(&submission_id)
        .await?;
    Ok(Json(intent))
}

pub async fn confirm_delete_submission(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .service
        .confirm_delete_submission(&submission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
