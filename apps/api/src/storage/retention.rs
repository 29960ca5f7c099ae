use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{Storage, StorageError};
use crate::models::{
    Analysis, AnalysisStatus, Document, DocumentStatus, MatchResult, NewAnalysis, NewDocument,
};

/// Hides job descriptions older than the configured TTL from list and stats views.
///
/// Applied once, around whichever backend is configured. Nothing is deleted:
/// `get_document` still returns expired job descriptions and candidate
/// profiles are never hidden.
pub struct RetentionStorage {
    inner: Arc<dyn Storage>,
    job_description_ttl: Option<Duration>,
}

impl RetentionStorage {
    /// `ttl_days == 0` disables the policy.
    pub fn new(inner: Arc<dyn Storage>, ttl_days: u32) -> Self {
        Self {
            inner,
            job_description_ttl: (ttl_days > 0).then(|| Duration::days(i64::from(ttl_days))),
        }
    }

    fn retain_visible(&self, documents: Vec<Document>, now: DateTime<Utc>) -> Vec<Document> {
        let Some(ttl) = self.job_description_ttl else {
            return documents;
        };
        // A TTL reaching past the representable calendar hides nothing.
        let Some(cutoff) = now.checked_sub_signed(ttl) else {
            return documents;
        };
        documents
            .into_iter()
            .filter(|d| !d.is_job_description() || d.uploaded_at >= cutoff)
            .collect()
    }
}

#[async_trait]
impl Storage for RetentionStorage {
    async fn create_document(&self, new: NewDocument) -> Result<Document, StorageError> {
        self.inner.create_document(new).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        self.inner.get_document(id).await
    }

    async fn get_all_documents(&self) -> Result<Vec<Document>, StorageError> {
        let documents = self.inner.get_all_documents().await?;
        Ok(self.retain_visible(documents, Utc::now()))
    }

    async fn get_documents_by_job(&self, job_id: &str) -> Result<Vec<Document>, StorageError> {
        self.inner.get_documents_by_job(job_id).await
    }

    async fn delete_document(&self, id: &str) -> Result<bool, StorageError> {
        self.inner.delete_document(id).await
    }

    async fn update_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<bool, StorageError> {
        self.inner.update_document_status(id, status).await
    }

    async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis, StorageError> {
        self.inner.create_analysis(new).await
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<Analysis>, StorageError> {
        self.inner.get_analysis(id).await
    }

    async fn get_all_analyses(&self) -> Result<Vec<Analysis>, StorageError> {
        self.inner.get_all_analyses().await
    }

    async fn update_analysis_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        results: Option<Vec<MatchResult>>,
    ) -> Result<bool, StorageError> {
        self.inner.update_analysis_status(id, status, results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::storage::tests::exercise_contract;
    use crate::storage::MemoryStorage;

    fn doc(doc_type: DocumentType, age_days: i64, now: DateTime<Utc>) -> Document {
        let uploaded = now - Duration::days(age_days);
        Document {
            id: format!("{}-{age_days}", doc_type.as_str()),
            name: "doc".to_string(),
            doc_type,
            content: String::new(),
            status: DocumentStatus::Completed,
            job_description_id: None,
            uploaded_at: uploaded,
            created_at: uploaded,
        }
    }

    #[tokio::test]
    async fn test_retention_wrapper_satisfies_contract() {
        let storage = RetentionStorage::new(Arc::new(MemoryStorage::new()), 90);
        exercise_contract(&storage).await;
    }

    #[test]
    fn test_stale_job_descriptions_are_hidden() {
        let now = Utc::now();
        let storage = RetentionStorage::new(Arc::new(MemoryStorage::new()), 90);
        let visible = storage.retain_visible(
            vec![
                doc(DocumentType::JobDescription, 10, now),
                doc(DocumentType::JobDescription, 91, now),
                doc(DocumentType::ConsultantProfile, 400, now),
            ],
            now,
        );

        let ids: Vec<&str> = visible.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["job_description-10", "consultant_profile-400"]);
    }

    #[test]
    fn test_zero_ttl_disables_policy() {
        let now = Utc::now();
        let storage = RetentionStorage::new(Arc::new(MemoryStorage::new()), 0);
        let visible = storage.retain_visible(vec![doc(DocumentType::JobDescription, 365, now)], now);
        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn test_ttl_beyond_calendar_range_hides_nothing() {
        let inner = Arc::new(MemoryStorage::new());
        let job = inner
            .create_document(NewDocument {
                name: "jd.txt".to_string(),
                doc_type: DocumentType::JobDescription,
                content: "JD".to_string(),
                job_description_id: None,
            })
            .await
            .unwrap();

        let storage = RetentionStorage::new(inner, u32::MAX);
        let documents = storage.get_all_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, job.id);
        assert_eq!(storage.get_stats().await.unwrap().total_documents, 1);
    }
}
