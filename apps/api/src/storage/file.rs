use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{new_id, sort_analyses_newest_first, sort_documents_newest_first, Storage, StorageError};
use crate::models::{
    Analysis, AnalysisStatus, Document, DocumentStatus, MatchResult, NewAnalysis, NewDocument,
};

const DOCUMENTS_FILE: &str = "documents.json";
const ANALYSES_FILE: &str = "analyses.json";

#[derive(Default, Clone)]
struct Snapshot {
    documents: HashMap<String, Document>,
    analyses: HashMap<String, Analysis>,
}

/// JSON-file-backed storage.
///
/// Both arrays are rewritten in full after every mutation. The snapshot lock is
/// held across the write, so mutations within one process never interleave.
/// A mutation only becomes visible once its write has succeeded.
pub struct FileStorage {
    documents_path: PathBuf,
    analyses_path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl FileStorage {
    /// Opens (or initialises) the data directory and loads any existing snapshot.
    pub async fn open(data_dir: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(data_dir).await?;

        let documents_path = data_dir.join(DOCUMENTS_FILE);
        let analyses_path = data_dir.join(ANALYSES_FILE);

        let documents: Vec<Document> = load_array(&documents_path).await;
        let analyses: Vec<Analysis> = load_array(&analyses_path).await;
        info!(
            "Loaded {} documents and {} analyses from {}",
            documents.len(),
            analyses.len(),
            data_dir.display()
        );

        Ok(Self {
            documents_path,
            analyses_path,
            snapshot: Mutex::new(Snapshot {
                documents: documents.into_iter().map(|d| (d.id.clone(), d)).collect(),
                analyses: analyses.into_iter().map(|a| (a.id.clone(), a)).collect(),
            }),
        })
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let mut documents: Vec<&Document> = snapshot.documents.values().collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        let mut analyses: Vec<&Analysis> = snapshot.analyses.values().collect();
        analyses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tokio::fs::write(&self.documents_path, serde_json::to_vec_pretty(&documents)?).await?;
        tokio::fs::write(&self.analyses_path, serde_json::to_vec_pretty(&analyses)?).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the snapshot, persists the copy and only
    /// then makes it current. `None` from `change` means nothing was touched.
    async fn commit<R>(
        &self,
        change: impl FnOnce(&mut Snapshot) -> Option<R>,
    ) -> Result<Option<R>, StorageError> {
        let mut current = self.snapshot.lock().await;
        let mut next = current.clone();
        let Some(out) = change(&mut next) else {
            return Ok(None);
        };
        self.persist(&next).await?;
        *current = next;
        Ok(Some(out))
    }
}

/// A missing or unreadable file starts the collection empty.
async fn load_array<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {e}; starting empty", path.display());
            return Vec::new();
        }
    };
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        warn!("Failed to parse {}: {e}; starting empty", path.display());
        Vec::new()
    })
}

#[async_trait]
impl Storage for FileStorage {
    async fn create_document(&self, new: NewDocument) -> Result<Document, StorageError> {
        let document = new.into_document(new_id(), Utc::now());
        self.commit(|snapshot| {
            snapshot
                .documents
                .insert(document.id.clone(), document.clone());
            Some(())
        })
        .await?;
        Ok(document)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.snapshot.lock().await.documents.get(id).cloned())
    }

    async fn get_all_documents(&self) -> Result<Vec<Document>, StorageError> {
        let mut documents: Vec<Document> =
            self.snapshot.lock().await.documents.values().cloned().collect();
        sort_documents_newest_first(&mut documents);
        Ok(documents)
    }

    async fn delete_document(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self
            .commit(|snapshot| snapshot.documents.remove(id).map(|_| ()))
            .await?
            .is_some())
    }

    async fn update_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<bool, StorageError> {
        Ok(self
            .commit(|snapshot| {
                let document = snapshot.documents.get_mut(id)?;
                document.status = status;
                Some(())
            })
            .await?
            .is_some())
    }

    async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis, StorageError> {
        let analysis = new.into_analysis(new_id(), Utc::now());
        self.commit(|snapshot| {
            snapshot
                .analyses
                .insert(analysis.id.clone(), analysis.clone());
            Some(())
        })
        .await?;
        Ok(analysis)
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<Analysis>, StorageError> {
        Ok(self.snapshot.lock().await.analyses.get(id).cloned())
    }

    async fn get_all_analyses(&self) -> Result<Vec<Analysis>, StorageError> {
        let mut analyses: Vec<Analysis> =
            self.snapshot.lock().await.analyses.values().cloned().collect();
        sort_analyses_newest_first(&mut analyses);
        Ok(analyses)
    }

    async fn update_analysis_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        results: Option<Vec<MatchResult>>,
    ) -> Result<bool, StorageError> {
        Ok(self
            .commit(|snapshot| {
                let analysis = snapshot.analyses.get_mut(id)?;
                analysis.status = status;
                if let Some(results) = results {
                    analysis.results = results;
                }
                Some(())
            })
            .await?
            .is_some())
    }
}
