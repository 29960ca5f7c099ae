//! In-memory notification log, keyed by user id.
//!
//! Purely observational: nothing reads notifications back to make decisions,
//! and they do not survive a restart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::MatchResult;

pub mod handlers;

pub const DEFAULT_USER: &str = "default";
/// Older notifications beyond this count are dropped per user.
pub const MAX_PER_USER: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProcessingStarted,
    ProcessingComplete,
    HighSimilarityMatch,
    AnalysisFailed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NotificationService {
    by_user: RwLock<HashMap<String, Vec<Notification>>>,
}

fn user_key(user_id: Option<&str>) -> String {
    user_id.unwrap_or(DEFAULT_USER).to_string()
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(
        &self,
        user_id: Option<&str>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Value,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            kind,
            title: title.into(),
            message: message.into(),
            data,
            read: false,
            created_at: Utc::now(),
        };

        let mut by_user = self.by_user.write().await;
        let list = by_user.entry(user_key(user_id)).or_default();
        list.insert(0, notification.clone());
        list.truncate(MAX_PER_USER);
        notification
    }

    /// Newest first.
    pub async fn list(&self, user_id: Option<&str>) -> Vec<Notification> {
        self.by_user
            .read()
            .await
            .get(&user_key(user_id))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn unread_count(&self, user_id: Option<&str>) -> usize {
        self.by_user
            .read()
            .await
            .get(&user_key(user_id))
            .map(|list| list.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    pub async fn mark_read(&self, id: &str, user_id: Option<&str>) -> bool {
        let mut by_user = self.by_user.write().await;
        let Some(list) = by_user.get_mut(&user_key(user_id)) else {
            return false;
        };
        match list.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub async fn mark_all_read(&self, user_id: Option<&str>) {
        if let Some(list) = self.by_user.write().await.get_mut(&user_key(user_id)) {
            list.iter_mut().for_each(|n| n.read = true);
        }
    }

    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> bool {
        let mut by_user = self.by_user.write().await;
        let Some(list) = by_user.get_mut(&user_key(user_id)) else {
            return false;
        };
        let before = list.len();
        list.retain(|n| n.id != id);
        list.len() != before
    }

    // Analysis lifecycle helpers

    pub async fn notify_processing_started(&self, job_title: &str, user_id: Option<&str>) {
        self.create(
            user_id,
            NotificationKind::ProcessingStarted,
            "Analysis Started",
            format!("Processing analysis for \"{job_title}\"."),
            json!({ "jobTitle": job_title }),
        )
        .await;
    }

    pub async fn notify_processing_complete(
        &self,
        job_title: &str,
        match_count: usize,
        user_id: Option<&str>,
    ) {
        self.create(
            user_id,
            NotificationKind::ProcessingComplete,
            "Analysis Complete",
            format!("Analysis for \"{job_title}\" completed with {match_count} matches found."),
            json!({ "jobTitle": job_title, "matchCount": match_count }),
        )
        .await;
    }

    pub async fn notify_high_similarity(
        &self,
        job_title: &str,
        high_matches: &[&MatchResult],
        threshold: f64,
        user_id: Option<&str>,
    ) {
        self.create(
            user_id,
            NotificationKind::HighSimilarityMatch,
            "High Similarity Matches Found!",
            format!(
                "Found {} candidate(s) with {threshold}%+ similarity for \"{job_title}\".",
                high_matches.len()
            ),
            json!({ "jobTitle": job_title, "matches": high_matches }),
        )
        .await;
    }

    pub async fn notify_analysis_failed(&self, job_title: &str, user_id: Option<&str>) {
        self.create(
            user_id,
            NotificationKind::AnalysisFailed,
            "Analysis Failed",
            format!("Analysis for \"{job_title}\" failed to complete."),
            json!({ "jobTitle": job_title }),
        )
        .await;
    }

    pub async fn notify_reverse_match_complete(
        &self,
        candidate_summary: &str,
        match_count: usize,
        top_match: Option<&str>,
    ) {
        self.create(
            None,
            NotificationKind::ProcessingComplete,
            "Reverse Match Complete",
            format!("Resume analysis completed with {match_count} job recommendations found."),
            json!({
                "type": "reverse_match",
                "candidateSummary": candidate_summary,
                "matchCount": match_count,
                "topMatch": top_match.unwrap_or("Unknown"),
            }),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newest_first_and_capped_per_user() {
        let service = NotificationService::new();
        for i in 0..(MAX_PER_USER + 5) {
            service
                .create(None, NotificationKind::ProcessingStarted, "t", format!("m{i}"), Value::Null)
                .await;
        }
        let list = service.list(None).await;
        assert_eq!(list.len(), MAX_PER_USER);
        assert_eq!(list[0].message, format!("m{}", MAX_PER_USER + 4));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let service = NotificationService::new();
        service.notify_processing_started("Backend", Some("alice")).await;
        assert!(service.list(None).await.is_empty());
        assert_eq!(service.list(Some("alice")).await.len(), 1);
        assert_eq!(service.list(Some(DEFAULT_USER)).await.len(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_and_delete() {
        let service = NotificationService::new();
        let first = service
            .create(None, NotificationKind::AnalysisFailed, "a", "b", Value::Null)
            .await;
        service.notify_processing_complete("Backend", 2, None).await;
        assert_eq!(service.unread_count(None).await, 2);

        assert!(service.mark_read(&first.id, None).await);
        assert!(!service.mark_read("missing", None).await);
        assert!(!service.mark_read(&first.id, Some("someone-else")).await);
        assert_eq!(service.unread_count(None).await, 1);

        service.mark_all_read(None).await;
        assert_eq!(service.unread_count(None).await, 0);

        assert!(service.delete(&first.id, None).await);
        assert!(!service.delete(&first.id, None).await);
        assert_eq!(service.list(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_notification_serializes_type_field() {
        let service = NotificationService::new();
        service.notify_analysis_failed("Backend", None).await;
        let value = serde_json::to_value(&service.list(None).await[0]).unwrap();
        assert_eq!(value["type"], "analysis_failed");
        assert_eq!(value["read"], false);
        assert_eq!(value["data"]["jobTitle"], "Backend");
    }
}
