use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{new_id, sort_analyses_newest_first, sort_documents_newest_first, Storage, StorageError};
use crate::models::{
    Analysis, AnalysisStatus, Document, DocumentStatus, MatchResult, NewAnalysis, NewDocument,
};

/// Volatile storage. Everything is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, Document>>,
    analyses: RwLock<HashMap<String, Analysis>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_document(&self, new: NewDocument) -> Result<Document, StorageError> {
        let document = new.into_document(new_id(), Utc::now());
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn get_all_documents(&self) -> Result<Vec<Document>, StorageError> {
        let mut documents: Vec<Document> = self.documents.read().await.values().cloned().collect();
        sort_documents_newest_first(&mut documents);
        Ok(documents)
    }

    async fn delete_document(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.documents.write().await.remove(id).is_some())
    }

    async fn update_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<bool, StorageError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(id) {
            Some(document) => {
                document.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis, StorageError> {
        let analysis = new.into_analysis(new_id(), Utc::now());
        self.analyses
            .write()
            .await
            .insert(analysis.id.clone(), analysis.clone());
        Ok(analysis)
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<Analysis>, StorageError> {
        Ok(self.analyses.read().await.get(id).cloned())
    }

    async fn get_all_analyses(&self) -> Result<Vec<Analysis>, StorageError> {
        let mut analyses: Vec<Analysis> = self.analyses.read().await.values().cloned().collect();
        sort_analyses_newest_first(&mut analyses);
        Ok(analyses)
    }

    async fn update_analysis_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        results: Option<Vec<MatchResult>>,
    ) -> Result<bool, StorageError> {
        let mut analyses = self.analyses.write().await;
        match analyses.get_mut(id) {
            Some(analysis) => {
                analysis.status = status;
                if let Some(results) = results {
                    analysis.results = results;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::exercise_contract;

    #[tokio::test]
    async fn test_memory_storage_satisfies_contract() {
        exercise_contract(&MemoryStorage::new()).await;
    }
}
