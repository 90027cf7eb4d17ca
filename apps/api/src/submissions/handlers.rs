use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;
use crate::submissions::export::submissions_to_csv;
use crate::submissions::models::Submission;
use crate::submissions::validation::validate_submission;

#[derive(Debug, Serialize)]
pub struct CreateSubmissionResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<Submission>,
}

/// POST /api/submit-abstract
pub async fn handle_submit_abstract(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreateSubmissionResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let record = validate_submission(&payload).map_err(|errors| {
        let fields: Vec<&str> = errors.fields().collect();
        warn!("Rejected submission; invalid fields: {}", fields.join(", "));
        AppError::Validation(errors)
    })?;
    let id = state.store.create_submission(&record).await?;

    Ok(Json(CreateSubmissionResponse {
        message: "Submission received successfully!".to_string(),
        id,
    }))
}

/// GET /api/admin/submissions
pub async fn handle_list_submissions(
    State(state): State<AppState>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let submissions = state.store.list_submissions().await?;
    Ok(Json(SubmissionListResponse { submissions }))
}

/// GET /api/admin/submissions/export
pub async fn handle_export_submissions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = state.store.list_submissions().await?;
    let csv = submissions_to_csv(&submissions)?;
    let filename = format!(
        "ecoinvent_submissions_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
