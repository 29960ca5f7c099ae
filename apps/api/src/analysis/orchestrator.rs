//! Background analysis runs.
//!
//! `start_analysis` persists the analysis as `processing` and detaches the run.
//! The run itself never returns an error: every failure ends in the analysis
//! being marked `failed` and an `analysis_failed` notification.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{Analysis, AnalysisStatus, Document, DocumentStatus, MatchResult, NewAnalysis};
use crate::scoring::{validate_candidate_scores, CandidateScore, DocumentText, ScoringError};
use crate::state::AppState;
use crate::storage::StorageError;

use super::Thresholds;

/// Longest job title kept on an analysis.
pub const MAX_TITLE_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// First non-empty line of the job text, or the document name when the text is blank.
pub fn derive_job_title(job: &Document) -> String {
    job.content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect::<String>().trim_end().to_string())
        .unwrap_or_else(|| job.name.clone())
}

/// Creates the analysis record and spawns its run. Returns as soon as the
/// record exists; the caller never waits on the scorer.
pub async fn start_analysis(
    state: &AppState,
    job: Document,
    user_email: Option<String>,
) -> Result<Analysis, StorageError> {
    let analysis = state
        .storage
        .create_analysis(NewAnalysis {
            job_description_id: job.id.clone(),
            job_title: derive_job_title(&job),
        })
        .await?;
    info!("Created analysis {} for job {}", analysis.id, job.id);

    tokio::spawn(run_analysis(
        state.clone(),
        analysis.clone(),
        job,
        user_email,
    ));

    Ok(analysis)
}

pub async fn run_analysis(
    state: AppState,
    analysis: Analysis,
    job: Document,
    user_email: Option<String>,
) {
    let title = analysis.job_title.as_str();
    state
        .notifications
        .notify_processing_started(title, None)
        .await;

    let outcome = match score_job(&state, &job).await {
        Ok(results) => state
            .storage
            .update_analysis_status(&analysis.id, AnalysisStatus::Completed, Some(results.clone()))
            .await
            .map(|_| results)
            .map_err(AnalysisError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(results) => {
            info!(
                "Analysis {} completed with {} result(s)",
                analysis.id,
                results.len()
            );
            announce_completion(&state, title, &results, user_email.as_deref()).await;
        }
        Err(e) => {
            error!("Analysis {} failed: {e}", analysis.id);
            if let Err(e) = state
                .storage
                .update_analysis_status(&analysis.id, AnalysisStatus::Failed, Some(Vec::new()))
                .await
            {
                error!("Could not mark analysis {} as failed: {e}", analysis.id);
            }
            state.notifications.notify_analysis_failed(title, None).await;
        }
    }
}

/// Scores the completed profiles linked to `job`. No candidates means no scorer call.
async fn score_job(state: &AppState, job: &Document) -> Result<Vec<MatchResult>, AnalysisError> {
    let candidates: Vec<Document> = state
        .storage
        .get_documents_by_job(&job.id)
        .await?
        .into_iter()
        .filter(|d| d.status == DocumentStatus::Completed)
        .collect();

    if candidates.is_empty() {
        info!("Job {} has no completed consultant profiles", job.id);
        return Ok(Vec::new());
    }

    let texts: Vec<DocumentText> = candidates.iter().map(DocumentText::from).collect();
    let scores = state.scorer.score(&job.content, &texts).await?;
    validate_candidate_scores(&scores, &texts)?;

    Ok(build_results(scores, &candidates, &state.config.thresholds))
}

/// Attaches names and statuses, highest overall score first.
pub fn build_results(
    scores: Vec<CandidateScore>,
    candidates: &[Document],
    thresholds: &Thresholds,
) -> Vec<MatchResult> {
    let names: HashMap<&str, &str> = candidates
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();

    let mut results: Vec<MatchResult> = scores
        .into_iter()
        .map(|s| MatchResult {
            consultant_name: names
                .get(s.consultant_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_default(),
            status: thresholds.classify(s.overall_score),
            consultant_id: s.consultant_id,
            role: s.role,
            overall_score: s.overall_score,
            skills_match: s.skills_match,
            experience_match: s.experience_match,
            context_match: s.context_match,
            matched_skills: s.matched_skills,
            experience_years: s.experience_years,
            summary: s.summary,
        })
        .collect();

    results.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    results
}

async fn announce_completion(
    state: &AppState,
    title: &str,
    results: &[MatchResult],
    user_email: Option<&str>,
) {
    let thresholds = &state.config.thresholds;
    let high: Vec<&MatchResult> = results
        .iter()
        .filter(|r| thresholds.is_high_similarity(r.overall_score))
        .collect();

    state
        .notifications
        .notify_processing_complete(title, results.len(), None)
        .await;
    if !high.is_empty() {
        state
            .notifications
            .notify_high_similarity(title, &high, thresholds.shortlist, None)
            .await;
    }

    let Some(to) = user_email else {
        return;
    };
    if let Err(e) = state
        .mailer
        .send_processing_complete(to, title, results.len())
        .await
    {
        warn!("Completion email to {to} failed: {e}");
    }
    if !high.is_empty() {
        if let Err(e) = state
            .mailer
            .send_high_similarity(to, title, &high, thresholds.shortlist)
            .await
        {
            warn!("High similarity email to {to} failed: {e}");
        }
    }
}
