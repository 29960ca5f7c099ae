use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a stored document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    JobDescription,
    ConsultantProfile,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::JobDescription => "job_description",
            DocumentType::ConsultantProfile => "consultant_profile",
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_description" => Ok(DocumentType::JobDescription),
            "consultant_profile" => Ok(DocumentType::ConsultantProfile),
            other => Err(format!("unknown document type '{other}'")),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text extraction lifecycle of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed),
            other => Err(format!("unknown document status '{other}'")),
        }
    }
}

/// A stored job description or candidate profile.
///
/// `content` is fixed at creation. `job_description_id` is a soft reference:
/// it is only set on consultant profiles and nothing enforces that the
/// referenced document still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub content: String,
    pub status: DocumentStatus,
    pub job_description_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn is_job_description(&self) -> bool {
        self.doc_type == DocumentType::JobDescription
    }
}

/// Insert payload for `Storage::create_document`.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: DocumentType,
    pub content: String,
    pub job_description_id: Option<String>,
}

impl NewDocument {
    /// Builds the stored record. New documents always start out `processing`.
    pub fn into_document(self, id: String, now: DateTime<Utc>) -> Document {
        Document {
            id,
            name: self.name,
            doc_type: self.doc_type,
            content: self.content,
            status: DocumentStatus::Processing,
            job_description_id: self.job_description_id,
            uploaded_at: now,
            created_at: now,
        }
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total_documents: usize,
    pub active_jobs: usize,
    pub matches_found: usize,
    pub processing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_with_camel_case_and_type_field() {
        let now = Utc::now();
        let doc = NewDocument {
            name: "cv.txt".to_string(),
            doc_type: DocumentType::ConsultantProfile,
            content: "Rust, 5 years".to_string(),
            job_description_id: Some("job-1".to_string()),
        }
        .into_document("doc-1".to_string(), now);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], json!("consultant_profile"));
        assert_eq!(value["status"], json!("processing"));
        assert_eq!(value["jobDescriptionId"], json!("job-1"));
        assert!(value.get("uploadedAt").is_some());
    }

    #[test]
    fn test_document_type_parses_known_values_only() {
        assert_eq!(
            "job_description".parse::<DocumentType>().unwrap(),
            DocumentType::JobDescription
        );
        assert!("resume".parse::<DocumentType>().is_err());
    }
}
