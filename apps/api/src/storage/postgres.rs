use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::{new_id, Storage, StorageError};
use crate::models::{
    Analysis, AnalysisStatus, Document, DocumentStatus, MatchResult, NewAnalysis, NewDocument,
};

const DOCUMENT_COLUMNS: &str =
    "id, name, doc_type, content, status, job_description_id, uploaded_at, created_at";
const ANALYSIS_COLUMNS: &str = "id, job_description_id, job_title, status, results, created_at";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    name: String,
    doc_type: String,
    content: String,
    status: String,
    job_description_id: Option<String>,
    uploaded_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StorageError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            doc_type: row.doc_type.parse().map_err(StorageError::Corrupt)?,
            status: row.status.parse().map_err(StorageError::Corrupt)?,
            id: row.id,
            name: row.name,
            content: row.content,
            job_description_id: row.job_description_id,
            uploaded_at: row.uploaded_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AnalysisRow {
    id: String,
    job_description_id: String,
    job_title: String,
    status: String,
    results: Json<Vec<MatchResult>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for Analysis {
    type Error = StorageError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(Analysis {
            status: row.status.parse().map_err(StorageError::Corrupt)?,
            id: row.id,
            job_description_id: row.job_description_id,
            job_title: row.job_title,
            results: row.results.0,
            created_at: row.created_at,
        })
    }
}

/// Relational backend over the `documents` and `analyses` tables (see `db::ensure_schema`).
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn create_document(&self, new: NewDocument) -> Result<Document, StorageError> {
        let document = new.into_document(new_id(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO documents
                (id, name, doc_type, content, status, job_description_id, uploaded_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&document.id)
        .bind(&document.name)
        .bind(document.doc_type.as_str())
        .bind(&document.content)
        .bind(document.status.as_str())
        .bind(&document.job_description_id)
        .bind(document.uploaded_at)
        .bind(document.created_at)
        .execute(&self.pool)
        .await?;
        Ok(document)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Document::try_from)
        .transpose()
    }

    async fn get_all_documents(&self) -> Result<Vec<Document>, StorageError> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY uploaded_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }

    async fn get_documents_by_job(&self, job_id: &str) -> Result<Vec<Document>, StorageError> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE job_description_id = $1 AND doc_type = 'consultant_profile' \
             ORDER BY uploaded_at DESC"
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }

    async fn delete_document(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE documents SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis, StorageError> {
        let analysis = new.into_analysis(new_id(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO analyses (id, job_description_id, job_title, status, results, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&analysis.id)
        .bind(&analysis.job_description_id)
        .bind(&analysis.job_title)
        .bind(analysis.status.as_str())
        .bind(Json(&analysis.results))
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;
        Ok(analysis)
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<Analysis>, StorageError> {
        sqlx::query_as::<_, AnalysisRow>(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Analysis::try_from)
        .transpose()
    }

    async fn get_all_analyses(&self) -> Result<Vec<Analysis>, StorageError> {
        sqlx::query_as::<_, AnalysisRow>(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Analysis::try_from)
        .collect()
    }

    async fn update_analysis_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        results: Option<Vec<MatchResult>>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE analyses SET status = $1, results = COALESCE($2, results) WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(results.map(Json))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
