use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sheetsmith_core::{
    CellClass, CellCoord, CellUpdate, EditorError, MergeToggle, RenderPatch, Semester,
};

use super::find_session;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FormulaBarRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct GrowRequest {
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub cols: usize,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    /// Typed starting year; a string or a number
    pub year: serde_json::Value,
    #[serde(default)]
    pub semester: Semester,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub toggle: MergeToggle,
    pub patch: RenderPatch,
}

/// Apply one toolbar change to the current selection
async fn apply_style(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(attribute): Json<sheetsmith_core::StyleAttribute>,
) -> Result<Json<RenderPatch>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    session.apply_style(&attribute)?;
    Ok(Json(session.flush().unwrap_or_default()))
}

/// Merge the selection, or unmerge the region under its anchor
async fn toggle_merge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MergeResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    let toggle = session.toggle_merge()?;
    Ok(Json(MergeResponse {
        toggle,
        patch: session.flush().unwrap_or_default(),
    }))
}

/// Edits made directly in the grid
async fn set_cells(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(updates): Json<Vec<CellUpdate>>,
) -> Result<Json<RenderPatch>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    session.set_cells(&updates);
    Ok(Json(session.flush().unwrap_or_default()))
}

/// Class names the widget carries for cells
async fn set_class_names(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(classes): Json<Vec<CellClass>>,
) -> Result<Json<RenderPatch>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    for class in &classes {
        session.set_cell_class_name(CellCoord::new(class.row, class.col), &class.class_name);
    }
    Ok(Json(session.flush().unwrap_or_default()))
}

async fn submit_formula_bar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FormulaBarRequest>,
) -> Result<Json<RenderPatch>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    session.submit_formula_bar(req.value)?;
    Ok(Json(session.flush().unwrap_or_default()))
}

/// Scroll reached an edge: append rows and/or columns
async fn grow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GrowRequest>,
) -> Result<Json<RenderPatch>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    session.grow(req.rows, req.cols);
    Ok(Json(session.flush().unwrap_or_default()))
}

async fn apply_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<RenderPatch>, AppError> {
    let year = match &req.year {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        other => return Err(EditorError::InvalidTemplateYear(other.to_string()).into()),
    };

    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;

    session.apply_template(&year, req.semester)?;
    tracing::info!(%id, year = %year, semester = ?req.semester, "Applied academic calendar template");

    Ok(Json(session.flush().unwrap_or_default()))
}

async fn stylesheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, id).await?;
    let css = session.lock().await.stylesheet_css();
    Ok(([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/style", post(apply_style))
        .route("/api/sessions/{id}/merge", post(toggle_merge))
        .route("/api/sessions/{id}/cells", put(set_cells))
        .route("/api/sessions/{id}/class-names", put(set_class_names))
        .route("/api/sessions/{id}/formula-bar", post(submit_formula_bar))
        .route("/api/sessions/{id}/grow", post(grow))
        .route("/api/sessions/{id}/template", post(apply_template))
        .route("/api/sessions/{id}/stylesheet.css", get(stylesheet))
}
