use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::refinement::{RefinementOutput, RefinementRequest};
use crate::state::AppState;

/// POST /api/refine-abstract
pub async fn handle_refine_abstract(
    State(state): State<AppState>,
    payload: Result<Json<RefinementRequest>, JsonRejection>,
) -> Result<Json<RefinementOutput>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|problems| AppError::BadRequest(problems.join(" ")))?;

    let output = state.refiner.refine(&request).await?;
    Ok(Json(output))
}
