use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sheetsmith_core::{RenderPatch, SelectionInfo, SelectionRect};

use super::find_session;
use crate::error::AppError;
use crate::AppState;

/// Full state of one session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub state: RenderPatch,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Selection corners from the widget, or a typed reference such as `B3:D7`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SelectRequest {
    Reference(ReferenceRequest),
    Rect(RectRequest),
}

#[derive(Debug, Deserialize)]
pub struct ReferenceRequest {
    pub reference: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectRequest {
    pub anchor_row: i64,
    pub anchor_col: i64,
    pub head_row: i64,
    pub head_col: i64,
    /// Add to the current selection instead of replacing it
    #[serde(default)]
    pub append: bool,
}

/// List all sessions
async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    let sessions = state
        .sessions
        .list()
        .await
        .into_iter()
        .map(|(id, created_at)| SessionSummary { id, created_at })
        .collect();
    Json(sessions)
}

/// Create a blank session
async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (id, session) = state.sessions.insert(state.new_session()).await;
    let snapshot = session.lock().await.snapshot();

    tracing::info!(%id, "Created session");
    Json(SessionResponse { id, state: snapshot })
}

/// Get a session snapshot by ID
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(SessionResponse { id, state: snapshot }))
}

/// Delete a session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("Session {} not found", id)));
    }
    tracing::info!(%id, "Deleted session");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectionInfo>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    let info = match req {
        SelectRequest::Reference(r) => session.select_reference(&r.reference)?,
        SelectRequest::Rect(r) => {
            let rect = SelectionRect::new(r.anchor_row, r.anchor_col, r.head_row, r.head_col);
            if r.append {
                session.add_to_selection(rect)
            } else {
                session.select(rect)
            }
        }
    };
    Ok(Json(info))
}

async fn deselect(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = find_session(&state, id).await?;
    session.lock().await.deselect();
    Ok(Json(serde_json::json!({ "deselected": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/selection", put(select).delete(deselect))
}
