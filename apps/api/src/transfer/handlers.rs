//! Axum route handlers for CSV import and export.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::tracker::payload::AppPath;
use crate::tracker::projects::get_project;
use crate::transfer::export::export_project;
use crate::transfer::import::{import_csv, ImportResponse};

const FILE_FIELD: &str = "file";

/// POST /api/projects/:id/import
/// Multipart upload with the CSV in the `file` field.
pub async fn handle_import(
    State(state): State<AppState>,
    AppPath(project_id): AppPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    get_project(&state.db, project_id).await?;

    let mut multipart =
        multipart.map_err(|_| AppError::Validation("No file provided".to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Import(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AppError::Validation("No file selected".to_string()));
        }

        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Import(e.body_text()))?;
        tracing::info!(
            "Received import '{file_name}' ({} bytes) for project {project_id}",
            content.len()
        );

        let response = import_csv(&state.db, project_id, &content).await?;
        return Ok(Json(response));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

/// GET /api/projects/:id/export
/// Returns the project as a downloadable CSV attachment.
pub async fn handle_export(
    State(state): State<AppState>,
    AppPath(project_id): AppPath<i64>,
) -> Result<Response, AppError> {
    let export = export_project(&state.db, project_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}
