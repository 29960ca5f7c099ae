//! Axum route handlers for analyses, manual overrides, reverse matching and
//! the Gemini connectivity check.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::orchestrator::start_analysis;
use crate::analysis::reverse::{reverse_match, ReverseMatchError};
use crate::errors::AppError;
use crate::llm_client::prompts::CONNECTIVITY_CHECK_PROMPT;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::{Analysis, CandidateStatus};
use crate::scoring::ReverseMatchReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub job_description_id: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisResponse {
    pub message: String,
    pub analysis_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CandidateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStatusResponse {
    pub message: String,
    pub candidate_id: String,
    pub new_status: CandidateStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseMatchRequest {
    #[serde(default)]
    pub resume_content: String,
    pub user_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestGeminiRequest {
    #[serde(default)]
    pub api_key: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analysis
pub async fn handle_start_analysis(
    State(state): State<AppState>,
    Json(req): Json<StartAnalysisRequest>,
) -> Result<(StatusCode, Json<StartAnalysisResponse>), AppError> {
    let job_id = non_blank(req.job_description_id)
        .ok_or_else(|| AppError::Validation("jobDescriptionId is required".to_string()))?;

    let job = state
        .storage
        .get_document(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {job_id} not found")))?;
    if !job.is_job_description() {
        return Err(AppError::Validation(format!(
            "Document {job_id} is not a job description"
        )));
    }

    let analysis = start_analysis(&state, job, non_blank(req.user_email)).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            message: "Analysis started".to_string(),
            analysis_id: analysis.id,
        }),
    ))
}

/// GET /api/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Analysis>>, AppError> {
    Ok(Json(state.storage.get_all_analyses().await?))
}

/// GET /api/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Analysis>, AppError> {
    state
        .storage
        .get_analysis(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}

/// PATCH /api/analyses/:analysisId/candidates/:candidateId/status
pub async fn handle_update_candidate_status(
    State(state): State<AppState>,
    Path((analysis_id, candidate_id)): Path<(String, String)>,
    Json(req): Json<CandidateStatusRequest>,
) -> Result<Json<CandidateStatusResponse>, AppError> {
    let new_status = match req.status.as_str() {
        "shortlisted" => CandidateStatus::Shortlisted,
        "rejected" => CandidateStatus::Rejected,
        other => {
            return Err(AppError::Validation(format!(
                "Invalid status '{other}'; expected 'shortlisted' or 'rejected'"
            )))
        }
    };

    let mut analysis = state
        .storage
        .get_analysis(&analysis_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {analysis_id} not found")))?;

    let result = analysis.find_result_mut(&candidate_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Candidate {candidate_id} not found in analysis {analysis_id}"
        ))
    })?;
    result.status = new_status;

    let updated = state
        .storage
        .update_analysis_status(&analysis.id, analysis.status, Some(analysis.results))
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("Analysis {analysis_id} not found")));
    }

    info!("Candidate {candidate_id} in analysis {analysis_id} set to {new_status}");
    Ok(Json(CandidateStatusResponse {
        message: "Candidate status updated successfully".to_string(),
        candidate_id,
        new_status,
    }))
}

/// POST /api/reverse-match
pub async fn handle_reverse_match(
    State(state): State<AppState>,
    Json(req): Json<ReverseMatchRequest>,
) -> Result<Json<ReverseMatchReport>, AppError> {
    if req.resume_content.trim().is_empty() {
        return Err(AppError::Validation("resumeContent is required".to_string()));
    }

    let email = non_blank(req.user_email);
    reverse_match(&state, &req.resume_content, email.as_deref())
        .await
        .map(Json)
        .map_err(|e| match e {
            ReverseMatchError::Storage(e) => AppError::Storage(e),
            ReverseMatchError::Scoring(e) => AppError::Llm(format!("Reverse match failed: {e}")),
        })
}

/// POST /api/test-gemini
pub async fn handle_test_gemini(
    Json(req): Json<TestGeminiRequest>,
) -> Result<Json<Value>, AppError> {
    if req.api_key.trim().is_empty() {
        return Err(AppError::Validation("apiKey is required".to_string()));
    }

    let llm_error = |e: LlmError| AppError::LlmCheck(format!("Gemini API test failed: {e}"));
    let client = LlmClient::new(req.api_key.trim().to_string()).map_err(llm_error)?;
    let response = client
        .call_text(CONNECTIVITY_CHECK_PROMPT, None)
        .await
        .map_err(llm_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Gemini API connection successful",
        "response": response,
    })))
}
