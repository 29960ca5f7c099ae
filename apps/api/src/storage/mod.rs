//! Storage: one contract, three interchangeable backends.
//!
//! The backend is picked once at startup from `STORAGE_TYPE` and carried in
//! `AppState` as `Arc<dyn Storage>`. Every backend answers unknown ids with
//! `Ok(None)` / `Ok(false)`; only I/O or database failures are errors.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::models::{
    Analysis, AnalysisStatus, Document, DocumentStats, DocumentStatus, DocumentType, MatchResult,
    NewAnalysis, NewDocument,
};

pub mod file;
pub mod memory;
pub mod postgres;
pub mod retention;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use retention::RetentionStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_document(&self, new: NewDocument) -> Result<Document, StorageError>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError>;

    /// All visible documents, newest upload first.
    async fn get_all_documents(&self) -> Result<Vec<Document>, StorageError>;

    async fn delete_document(&self, id: &str) -> Result<bool, StorageError>;

    async fn update_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<bool, StorageError>;

    async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis, StorageError>;

    async fn get_analysis(&self, id: &str) -> Result<Option<Analysis>, StorageError>;

    /// All analyses, newest first.
    async fn get_all_analyses(&self) -> Result<Vec<Analysis>, StorageError>;

    /// Moves an analysis to `status`. `results`, when given, replaces the whole array.
    async fn update_analysis_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        results: Option<Vec<MatchResult>>,
    ) -> Result<bool, StorageError>;

    /// Consultant profiles uploaded against `job_id`, newest first.
    async fn get_documents_by_job(&self, job_id: &str) -> Result<Vec<Document>, StorageError> {
        Ok(self
            .get_all_documents()
            .await?
            .into_iter()
            .filter(|d| {
                d.doc_type == DocumentType::ConsultantProfile
                    && d.job_description_id.as_deref() == Some(job_id)
            })
            .collect())
    }

    /// Derived from the two list views so that `total_documents` always equals
    /// `get_all_documents().len()`.
    async fn get_stats(&self) -> Result<DocumentStats, StorageError> {
        let documents = self.get_all_documents().await?;
        let analyses = self.get_all_analyses().await?;
        Ok(compute_stats(&documents, &analyses))
    }
}

pub fn compute_stats(documents: &[Document], analyses: &[Analysis]) -> DocumentStats {
    DocumentStats {
        total_documents: documents.len(),
        active_jobs: documents
            .iter()
            .filter(|d| d.is_job_description() && d.status == DocumentStatus::Completed)
            .count(),
        matches_found: analyses
            .iter()
            .filter(|a| a.status == AnalysisStatus::Completed)
            .map(|a| a.results.len())
            .sum(),
        processing: documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Processing)
            .count(),
    }
}

pub(crate) fn sort_documents_newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
}

pub(crate) fn sort_analyses_newest_first(analyses: &mut [Analysis]) {
    analyses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builds the configured backend, wrapped in the job description retention policy.
pub async fn build_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    let backend: Arc<dyn Storage> = match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage (data is lost on restart)");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::File => {
            info!("Using file-backed storage in {}", config.data_dir.display());
            Arc::new(FileStorage::open(&config.data_dir).await?)
        }
        StorageBackend::Postgres => {
            info!("Using PostgreSQL storage");
            let pool = crate::db::create_pool(&config.database_url).await?;
            crate::db::ensure_schema(&pool).await?;
            Arc::new(PostgresStorage::new(pool))
        }
    };

    Ok(Arc::new(RetentionStorage::new(
        backend,
        config.job_description_ttl_days,
    )))
}
