use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use sheetsmith_export::{
    export_csv, export_xlsx, CSV_CONTENT_TYPE, CSV_FILE_NAME, XLSX_CONTENT_TYPE, XLSX_FILE_NAME,
};

use super::find_session;
use crate::error::AppError;
use crate::AppState;

fn download(bytes: Vec<u8>, content_type: &'static str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Styled workbook with merged regions
async fn export_workbook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let export = {
        let session = session.lock().await;
        export_xlsx(
            session.grid(),
            session.merges().as_slice(),
            session.styles(),
            session.column_widths(),
        )?
    };

    if export.merges_skipped > 0 {
        tracing::warn!(%id, skipped = export.merges_skipped, "Some merged regions were not exported");
    }
    tracing::info!(%id, cells = export.cells_written, merges = export.merges_written, "Exported XLSX");

    Ok(download(export.bytes, XLSX_CONTENT_TYPE, XLSX_FILE_NAME))
}

/// Values only
async fn export_values(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let bytes = export_csv(session.lock().await.grid())?;

    tracing::info!(%id, size = bytes.len(), "Exported CSV");
    Ok(download(bytes, CSV_CONTENT_TYPE, CSV_FILE_NAME))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/export.xlsx", get(export_workbook))
        .route("/api/sessions/{id}/export.csv", get(export_values))
}
