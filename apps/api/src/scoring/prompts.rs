// Scoring prompt templates and response schemas.

use serde_json::{json, Value};

use super::DocumentText;

pub const MATCH_SYSTEM: &str = "\
You are an expert recruitment assistant that compares candidate profiles with a job description. \
Score honestly; do not reward keyword stuffing. \
You MUST respond with valid JSON only.";

pub const MATCH_PROMPT_TEMPLATE: &str = r#"Analyze the job description and the candidate profiles below.

JOB DESCRIPTION:
{job_description}

CANDIDATE PROFILES:
{profiles}

For EVERY candidate profile, report:
1. skillsMatch (0-100): how well their technical skills match the job requirements
2. experienceMatch (0-100): how well their experience level and background match
3. contextMatch (0-100): how well their overall profile fits the role
4. overallScore (0-100): weighted average of the three scores above
5. matchedSkills: the job-relevant skills found in the profile
6. experienceYears: years of experience as a short string, e.g. "5 years"
7. role: the candidate's current or most recent role/title
8. summary: one or two sentences explaining the score

Use the exact profile ID as consultantId. Return:
{"matches": [{"consultantId": "...", "role": "...", "overallScore": 0, "skillsMatch": 0,
"experienceMatch": 0, "contextMatch": 0, "matchedSkills": ["..."], "experienceYears": "...",
"summary": "..."}]}"#;

pub const REVERSE_MATCH_SYSTEM: &str = "\
You are an expert career advisor that matches one resume against open positions. \
You MUST respond with valid JSON only.";

pub const REVERSE_MATCH_PROMPT_TEMPLATE: &str = r#"Analyze the resume below against every job description.

RESUME:
{resume}

JOB DESCRIPTIONS:
{jobs}

Summarize the candidate in candidateSummary, then for EVERY job report jobId (the exact job ID),
jobTitle, overallScore, skillsMatch, experienceMatch and contextMatch (all 0-100),
keyMatchedSkills, potentialConcerns and a one-sentence recommendation."#;

/// Renders documents as numbered, id-tagged blocks.
pub fn render_documents(label: &str, documents: &[DocumentText]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "{label} {} (ID: {})\nName: {}\nContent:\n{}\n",
                i + 1,
                doc.id,
                doc.name,
                doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_match_prompt(job_text: &str, candidates: &[DocumentText]) -> String {
    MATCH_PROMPT_TEMPLATE
        .replace("{job_description}", job_text)
        .replace("{profiles}", &render_documents("Profile", candidates))
}

pub fn build_reverse_match_prompt(resume_text: &str, jobs: &[DocumentText]) -> String {
    REVERSE_MATCH_PROMPT_TEMPLATE
        .replace("{resume}", resume_text)
        .replace("{jobs}", &render_documents("Job", jobs))
}

fn string_array() -> Value {
    json!({"type": "ARRAY", "items": {"type": "STRING"}})
}

pub fn match_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "consultantId": {"type": "STRING"},
                        "role": {"type": "STRING"},
                        "overallScore": {"type": "NUMBER"},
                        "skillsMatch": {"type": "NUMBER"},
                        "experienceMatch": {"type": "NUMBER"},
                        "contextMatch": {"type": "NUMBER"},
                        "matchedSkills": string_array(),
                        "experienceYears": {"type": "STRING"},
                        "summary": {"type": "STRING"}
                    },
                    "required": [
                        "consultantId", "role", "overallScore", "skillsMatch",
                        "experienceMatch", "contextMatch", "matchedSkills",
                        "experienceYears", "summary"
                    ]
                }
            }
        },
        "required": ["matches"]
    })
}

pub fn reverse_match_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "candidateSummary": {"type": "STRING"},
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "jobId": {"type": "STRING"},
                        "jobTitle": {"type": "STRING"},
                        "overallScore": {"type": "NUMBER"},
                        "skillsMatch": {"type": "NUMBER"},
                        "experienceMatch": {"type": "NUMBER"},
                        "contextMatch": {"type": "NUMBER"},
                        "keyMatchedSkills": string_array(),
                        "potentialConcerns": string_array(),
                        "recommendation": {"type": "STRING"}
                    },
                    "required": [
                        "jobId", "jobTitle", "overallScore", "skillsMatch",
                        "experienceMatch", "contextMatch", "keyMatchedSkills",
                        "potentialConcerns", "recommendation"
                    ]
                }
            }
        },
        "required": ["candidateSummary", "matches"]
    })
}
