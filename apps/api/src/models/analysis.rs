use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one scoring run. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(AnalysisStatus::Processing),
            "completed" => Ok(AnalysisStatus::Completed),
            "failed" => Ok(AnalysisStatus::Failed),
            other => Err(format!("unknown analysis status '{other}'")),
        }
    }
}

/// Decision bucket for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Shortlisted,
    Rejected,
    Pending,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Shortlisted => "shortlisted",
            CandidateStatus::Rejected => "rejected",
            CandidateStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate's scores and decision within an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub consultant_id: String,
    pub consultant_name: String,
    pub role: String,
    pub overall_score: f64,
    pub skills_match: f64,
    pub experience_match: f64,
    pub context_match: f64,
    pub matched_skills: Vec<String>,
    pub experience_years: String,
    pub summary: String,
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub job_description_id: String,
    pub job_title: String,
    pub status: AnalysisStatus,
    #[serde(default)]
    pub results: Vec<MatchResult>,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    pub fn find_result_mut(&mut self, consultant_id: &str) -> Option<&mut MatchResult> {
        self.results
            .iter_mut()
            .find(|r| r.consultant_id == consultant_id)
    }
}

/// Insert payload for `Storage::create_analysis`.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub job_description_id: String,
    pub job_title: String,
}

impl NewAnalysis {
    pub fn into_analysis(self, id: String, now: DateTime<Utc>) -> Analysis {
        Analysis {
            id,
            job_description_id: self.job_description_id,
            job_title: self.job_title,
            status: AnalysisStatus::Processing,
            results: Vec::new(),
            created_at: now,
        }
    }
}
