//! Axum route handlers for documents and dashboard stats.

use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::errors::AppError;
use crate::ingest::{ingest_upload, resolve_target, IngestOutcome, UploadedFile};
use crate::models::{Document, DocumentStats};
use crate::state::AppState;

/// Multipart fields read from an upload request.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    doc_type: Option<String>,
    job_description_id: Option<String>,
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("type") => form.doc_type = Some(field.text().await.map_err(bad_multipart)?),
            Some("jobDescriptionId") => {
                form.job_description_id = Some(field.text().await.map_err(bad_multipart)?)
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/documents/upload
///
/// Responds with the created document, or `{message, documents}` for a ZIP.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let target = resolve_target(
        state.storage.as_ref(),
        form.doc_type.as_deref(),
        form.job_description_id,
    )
    .await?;

    let response = match ingest_upload(
        state.storage.as_ref(),
        file,
        &target,
        state.config.max_upload_bytes,
    )
    .await?
    {
        IngestOutcome::Single(document) => Json(document).into_response(),
        IngestOutcome::Archive(documents) => Json(json!({
            "message": format!("Processed {} files from ZIP archive", documents.len()),
            "documents": documents,
        }))
        .into_response(),
    };
    Ok(response)
}

/// GET /api/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.storage.get_all_documents().await?))
}

/// GET /api/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    state
        .storage
        .get_document(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
}

/// DELETE /api/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.storage.delete_document(&id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::NotFound(format!("Document {id} not found")))
    }
}

/// GET /api/stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<DocumentStats>, AppError> {
    Ok(Json(state.storage.get_stats().await?))
}
