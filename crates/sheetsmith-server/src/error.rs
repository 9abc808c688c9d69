use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use sheetsmith_ai::FillError;
use sheetsmith_core::EditorError;
use sheetsmith_export::ExportError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Fill(#[from] FillError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Editor(EditorError::MergeOverlap { .. }) => StatusCode::CONFLICT,
            AppError::Editor(_) => StatusCode::BAD_REQUEST,
            AppError::Fill(FillError::EmptyPrompt) => StatusCode::BAD_REQUEST,
            AppError::Fill(FillError::InFlight) => StatusCode::CONFLICT,
            AppError::Fill(FillError::Interrupted(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fill(_) => StatusCode::BAD_GATEWAY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Editor(e) => e.code(),
            AppError::Fill(e) => e.code(),
            AppError::Export(e) => e.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                "Export failed".to_string()
            }
            AppError::Fill(e) if !e.is_local() => {
                tracing::warn!("AI fill error: {}", e);
                e.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
