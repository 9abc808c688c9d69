use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sheetsmith_core::RenderPatch;

use super::find_session;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AiFillRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AiFillResponse {
    pub applied: usize,
    pub skipped: Vec<String>,
    pub patch: RenderPatch,
}

/// Fill the grid from a prompt via the cell map backend
async fn ai_fill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AiFillRequest>,
) -> Result<Json<AiFillResponse>, AppError> {
    let session = find_session(&state, id).await?;

    let report = state
        .fill
        .submit_prompt(&session, &req.prompt, req.model.as_deref())
        .await?;

    let patch = session.lock().await.flush().unwrap_or_default();
    Ok(Json(AiFillResponse {
        applied: report.applied,
        skipped: report.skipped,
        patch,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sessions/{id}/ai", post(ai_fill))
}
