mod ai;
mod editing;
mod export;
mod health;
mod sessions;

use axum::Router;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::SharedSession;
use crate::AppState;

/// Create the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(sessions::router())
        .merge(editing::router())
        .merge(ai::router())
        .merge(export::router())
}

/// Look up a session or fail with 404
async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
}
