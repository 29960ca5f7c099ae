//! Match scoring, the swappable capability that turns a job text and candidate
//! texts into per-candidate scores.
//!
//! Default: `GeminiScorer` (one JSON-schema-constrained call per analysis).
//! `AppState` holds an `Arc<dyn MatchScorer>`; tests plug in deterministic stubs.
//!
//! Validation lives here rather than in each scorer. One malformed entry fails
//! the whole answer.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::Document;

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiScorer;

// ────────────────────────────────────────────────────────────────────────────
// Data models shared across all scorer backends
// ────────────────────────────────────────────────────────────────────────────

/// A stored document reduced to what a scorer needs to see.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub id: String,
    pub name: String,
    pub content: String,
}

impl From<&Document> for DocumentText {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            content: doc.content.clone(),
        }
    }
}

/// Raw per-candidate scores as returned by a scorer. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateScore {
    pub consultant_id: String,
    pub role: String,
    pub overall_score: f64,
    pub skills_match: f64,
    pub experience_match: f64,
    pub context_match: f64,
    pub matched_skills: Vec<String>,
    pub experience_years: String,
    pub summary: String,
}

/// One job description scored against a single resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub job_id: String,
    pub job_title: String,
    pub overall_score: f64,
    pub skills_match: f64,
    pub experience_match: f64,
    pub context_match: f64,
    pub key_matched_skills: Vec<String>,
    pub potential_concerns: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseMatchReport {
    pub candidate_summary: String,
    pub matches: Vec<JobMatch>,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("score '{field}' for '{id}' is outside 0-100: {value}")]
    ScoreOutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("answer references unknown document '{0}'")]
    UnknownDocument(String),

    #[error("answer scores document '{0}' more than once")]
    DuplicateDocument(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the scoring backend without touching the
/// orchestrator or the handlers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Scores every candidate against one job description.
    async fn score(
        &self,
        job_text: &str,
        candidates: &[DocumentText],
    ) -> Result<Vec<CandidateScore>, ScoringError>;

    /// Scores one resume against every job description.
    async fn match_jobs(
        &self,
        resume_text: &str,
        jobs: &[DocumentText],
    ) -> Result<ReverseMatchReport, ScoringError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Answer validation
// ────────────────────────────────────────────────────────────────────────────

fn check_range(id: &str, field: &'static str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ScoringError::ScoreOutOfRange {
            id: id.to_string(),
            field,
            value,
        })
    }
}

/// Checks that every id was submitted, appears once, and every score is within 0–100.
fn check_ids<'a>(
    submitted: &[DocumentText],
    answered: impl Iterator<Item = &'a str>,
) -> Result<(), ScoringError> {
    let known: HashSet<&str> = submitted.iter().map(|d| d.id.as_str()).collect();
    let mut seen = HashSet::new();
    for id in answered {
        if !known.contains(id) {
            return Err(ScoringError::UnknownDocument(id.to_string()));
        }
        if !seen.insert(id) {
            return Err(ScoringError::DuplicateDocument(id.to_string()));
        }
    }
    Ok(())
}

pub fn validate_candidate_scores(
    scores: &[CandidateScore],
    candidates: &[DocumentText],
) -> Result<(), ScoringError> {
    check_ids(candidates, scores.iter().map(|s| s.consultant_id.as_str()))?;
    for s in scores {
        check_range(&s.consultant_id, "overallScore", s.overall_score)?;
        check_range(&s.consultant_id, "skillsMatch", s.skills_match)?;
        check_range(&s.consultant_id, "experienceMatch", s.experience_match)?;
        check_range(&s.consultant_id, "contextMatch", s.context_match)?;
    }
    Ok(())
}

pub fn validate_job_matches(
    report: &ReverseMatchReport,
    jobs: &[DocumentText],
) -> Result<(), ScoringError> {
    check_ids(jobs, report.matches.iter().map(|m| m.job_id.as_str()))?;
    for m in &report.matches {
        check_range(&m.job_id, "overallScore", m.overall_score)?;
        check_range(&m.job_id, "skillsMatch", m.skills_match)?;
        check_range(&m.job_id, "experienceMatch", m.experience_match)?;
        check_range(&m.job_id, "contextMatch", m.context_match)?;
    }
    Ok(())
}
