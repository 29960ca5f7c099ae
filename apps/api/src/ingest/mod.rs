//! Document ingestion: classify an upload, extract its text off the async
//! runtime and store one document per file (or per archive member).

use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::models::{Document, DocumentStatus, DocumentType, NewDocument};
use crate::storage::Storage;

pub mod extract;
pub mod handlers;

use extract::{extract_text, extract_zip, ExtractedText, FileKind};

/// One file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Where uploaded documents are filed.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub doc_type: DocumentType,
    pub job_description_id: Option<String>,
}

/// Result of one upload request.
#[derive(Debug)]
pub enum IngestOutcome {
    Single(Document),
    Archive(Vec<Document>),
}

/// Checks the declared type and, for consultant profiles, that the target
/// job description exists.
pub async fn resolve_target(
    storage: &dyn Storage,
    doc_type: Option<&str>,
    job_description_id: Option<String>,
) -> Result<UploadTarget, AppError> {
    let doc_type: DocumentType = doc_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Document type is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;

    let job_description_id = job_description_id.filter(|id| !id.trim().is_empty());

    match doc_type {
        DocumentType::JobDescription => Ok(UploadTarget {
            doc_type,
            job_description_id: None,
        }),
        DocumentType::ConsultantProfile => {
            let job_id = job_description_id.ok_or_else(|| {
                AppError::Validation(
                    "jobDescriptionId is required for consultant profiles".to_string(),
                )
            })?;
            match storage.get_document(&job_id).await? {
                Some(job) if job.is_job_description() => Ok(UploadTarget {
                    doc_type,
                    job_description_id: Some(job_id),
                }),
                _ => Err(AppError::Validation(format!(
                    "jobDescriptionId {job_id} does not name a job description"
                ))),
            }
        }
    }
}

/// Extracts and stores `file`. A ZIP yields one document per supported member,
/// each decompressed up to `max_member_bytes`.
pub async fn ingest_upload(
    storage: &dyn Storage,
    file: UploadedFile,
    target: &UploadTarget,
    max_member_bytes: usize,
) -> Result<IngestOutcome, AppError> {
    let kind = FileKind::detect(&file.filename, file.content_type.as_deref()).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported file type for {}; allowed: PDF, DOC, DOCX, TXT, ZIP",
            file.filename
        ))
    })?;

    if kind == FileKind::Zip {
        let bytes = file.bytes.clone();
        let entries = tokio::task::spawn_blocking(move || extract_zip(&bytes, max_member_bytes))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::Validation(e.to_string()))?;

        info!(
            "Expanding archive {} into {} document(s)",
            file.filename,
            entries.len()
        );
        let mut documents = Vec::with_capacity(entries.len());
        for entry in entries {
            documents.push(store(storage, entry.name, entry.text, target).await?);
        }
        return Ok(IngestOutcome::Archive(documents));
    }

    let UploadedFile {
        filename, bytes, ..
    } = file;
    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &name, kind))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(IngestOutcome::Single(
        store(storage, filename, text, target).await?,
    ))
}

/// Creates the document as `processing`, then settles it on the status its
/// extraction earned.
async fn store(
    storage: &dyn Storage,
    name: String,
    text: ExtractedText,
    target: &UploadTarget,
) -> Result<Document, AppError> {
    let mut document = storage
        .create_document(NewDocument {
            name,
            doc_type: target.doc_type,
            content: text.content,
            job_description_id: target.job_description_id.clone(),
        })
        .await?;

    let status = if text.degraded {
        DocumentStatus::Failed
    } else {
        DocumentStatus::Completed
    };
    storage.update_document_status(&document.id, status).await?;
    document.status = status;

    info!(
        "Stored {} {} ({}) as {}",
        document.doc_type,
        document.name,
        document.id,
        status.as_str()
    );
    Ok(document)
}
