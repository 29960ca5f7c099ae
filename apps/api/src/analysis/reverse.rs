//! Reverse match: one resume scored against every stored job description.

use tracing::{info, warn};

use crate::models::{Document, DocumentStatus};
use crate::scoring::{validate_job_matches, DocumentText, ReverseMatchReport, ScoringError};
use crate::state::AppState;
use crate::storage::StorageError;

use super::orchestrator::derive_job_title;

#[derive(Debug, thiserror::Error)]
pub enum ReverseMatchError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Completed job descriptions visible in the document list.
async fn open_jobs(state: &AppState) -> Result<Vec<Document>, StorageError> {
    Ok(state
        .storage
        .get_all_documents()
        .await?
        .into_iter()
        .filter(|d| d.is_job_description() && d.status == DocumentStatus::Completed)
        .collect())
}

/// Scores `resume` against the open jobs, best match first.
///
/// With no open jobs the report is empty and the scorer is not called.
pub async fn reverse_match(
    state: &AppState,
    resume: &str,
    user_email: Option<&str>,
) -> Result<ReverseMatchReport, ReverseMatchError> {
    let jobs = open_jobs(state).await?;
    if jobs.is_empty() {
        info!("Reverse match requested with no open job descriptions");
        return Ok(ReverseMatchReport {
            candidate_summary: String::new(),
            matches: Vec::new(),
        });
    }

    let texts: Vec<DocumentText> = jobs.iter().map(DocumentText::from).collect();
    let mut report = state.scorer.match_jobs(resume, &texts).await?;
    validate_job_matches(&report, &texts)?;

    // Titles shown to the user match the ones analyses use.
    for m in &mut report.matches {
        if let Some(job) = jobs.iter().find(|j| j.id == m.job_id) {
            m.job_title = derive_job_title(job);
        }
    }
    report
        .matches
        .sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    let top = report.matches.first().map(|m| m.job_title.as_str());
    state
        .notifications
        .notify_reverse_match_complete(&report.candidate_summary, report.matches.len(), top)
        .await;

    if let Some(to) = user_email {
        if let Err(e) = state
            .mailer
            .send_reverse_match_complete(
                to,
                &report.candidate_summary,
                report.matches.len(),
                top.unwrap_or("Unknown"),
            )
            .await
        {
            warn!("Reverse match email to {to} failed: {e}");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, NewDocument};
    use crate::scoring::testing::StubScorer;

    async fn seed_job(state: &AppState, content: &str, status: DocumentStatus) -> Document {
        let doc = state
            .storage
            .create_document(NewDocument {
                name: "jd.txt".to_string(),
                doc_type: DocumentType::JobDescription,
                content: content.to_string(),
                job_description_id: None,
            })
            .await
            .unwrap();
        state
            .storage
            .update_document_status(&doc.id, status)
            .await
            .unwrap();
        doc
    }

    #[tokio::test]
    async fn test_no_open_jobs_skips_scorer() {
        let scorer = StubScorer::echo(70.0);
        let state = AppState::for_tests(scorer.clone());
        seed_job(&state, "Failed JD", DocumentStatus::Failed).await;

        let report = reverse_match(&state, "Rust engineer", None).await.unwrap();
        assert_eq!(report.candidate_summary, "");
        assert!(report.matches.is_empty());
        assert_eq!(scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_matches_sorted_and_titled_from_job_text() {
        let state = AppState::for_tests(StubScorer::echo(70.0));
        seed_job(&state, "Backend Engineer\nGo", DocumentStatus::Completed).await;
        seed_job(&state, "Data Engineer\nSpark", DocumentStatus::Completed).await;

        let report = reverse_match(&state, "Rust engineer", None).await.unwrap();
        assert_eq!(report.matches.len(), 2);
        assert!(report.matches[0].overall_score >= report.matches[1].overall_score);
        let mut titles: Vec<&str> = report.matches.iter().map(|m| m.job_title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["Backend Engineer", "Data Engineer"]);

        let latest = &state.notifications.list(None).await[0];
        assert_eq!(latest.title, "Reverse Match Complete");
    }

    #[tokio::test]
    async fn test_scorer_failure_is_an_error() {
        let state = AppState::for_tests(StubScorer::failing());
        seed_job(&state, "SRE", DocumentStatus::Completed).await;
        assert!(reverse_match(&state, "resume", None).await.is_err());
    }
}
