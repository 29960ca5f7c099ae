use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::prompts::{
    build_match_prompt, build_reverse_match_prompt, match_response_schema,
    reverse_match_response_schema, MATCH_SYSTEM, REVERSE_MATCH_SYSTEM,
};
use super::{CandidateScore, DocumentText, MatchScorer, ReverseMatchReport, ScoringError};
use crate::llm_client::LlmClient;

#[derive(Debug, Deserialize)]
struct MatchEnvelope {
    matches: Vec<CandidateScore>,
}

/// Semantic scorer backed by Gemini. One request per call, no retries.
pub struct GeminiScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for GeminiScorer {
    async fn score(
        &self,
        job_text: &str,
        candidates: &[DocumentText],
    ) -> Result<Vec<CandidateScore>, ScoringError> {
        let prompt = build_match_prompt(job_text, candidates);
        info!("Scoring {} candidate(s) with Gemini", candidates.len());
        let envelope: MatchEnvelope = self
            .0
            .call_json(&prompt, MATCH_SYSTEM, &match_response_schema())
            .await?;
        Ok(envelope.matches)
    }

    async fn match_jobs(
        &self,
        resume_text: &str,
        jobs: &[DocumentText],
    ) -> Result<ReverseMatchReport, ScoringError> {
        let prompt = build_reverse_match_prompt(resume_text, jobs);
        info!("Reverse matching a resume against {} job(s)", jobs.len());
        Ok(self
            .0
            .call_json(&prompt, REVERSE_MATCH_SYSTEM, &reverse_match_response_schema())
            .await?)
    }
}
