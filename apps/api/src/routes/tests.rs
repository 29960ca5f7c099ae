//! Router-level scenarios driven through `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::build_router;
use crate::scoring::testing::StubScorer;
use crate::state::AppState;

const BOUNDARY: &str = "recruit-test-boundary";

fn app(scorer: StubScorer) -> Router {
    build_router(AppState::for_tests(scorer))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/documents/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn upload_job(app: &Router, text: &str) -> String {
    let (status, doc) = send(
        app,
        upload(&[("type", "job_description")], Some(("job.txt", text.as_bytes()))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    doc["id"].as_str().unwrap().to_string()
}

async fn upload_profile(app: &Router, job_id: &str, text: &str) -> String {
    let (status, doc) = send(
        app,
        upload(
            &[("type", "consultant_profile"), ("jobDescriptionId", job_id)],
            Some(("alice.txt", text.as_bytes())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    doc["id"].as_str().unwrap().to_string()
}

async fn start(app: &Router, job_id: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/analysis",
            json!({ "jobDescriptionId": job_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Analysis started");
    body["analysisId"].as_str().unwrap().to_string()
}

/// Polls until the analysis leaves `processing`.
async fn wait_for(app: &Router, analysis_id: &str) -> Value {
    for _ in 0..200 {
        let (_, analysis) = send(app, get(&format!("/api/analyses/{analysis_id}"))).await;
        if analysis["status"] != "processing" {
            return analysis;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("analysis {analysis_id} never finished");
}

#[tokio::test]
async fn test_health_and_dashboard() {
    let app = app(StubScorer::echo(70.0));
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&html).contains("/api/documents/upload"));
}

#[tokio::test]
async fn test_upload_analyze_and_list_scenario() {
    let app = app(StubScorer::echo(88.0));
    let job_id = upload_job(&app, "Senior Rust Engineer\nTokio, Axum").await;
    let profile_id = upload_profile(&app, &job_id, "Alice\nRust, 7 years").await;

    let analysis_id = start(&app, &job_id).await;
    let analysis = wait_for(&app, &analysis_id).await;
    assert_eq!(analysis["status"], "completed");
    assert_eq!(analysis["jobTitle"], "Senior Rust Engineer");
    assert_eq!(analysis["results"].as_array().unwrap().len(), 1);
    assert_eq!(analysis["results"][0]["consultantId"], profile_id.as_str());
    assert_eq!(analysis["results"][0]["status"], "shortlisted");

    let (_, analyses) = send(&app, get("/api/analyses")).await;
    let analyses = analyses.as_array().unwrap();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0]["jobDescriptionId"], job_id.as_str());

    let (_, stats) = send(&app, get("/api/stats")).await;
    let (_, documents) = send(&app, get("/api/documents")).await;
    assert_eq!(stats["totalDocuments"], json!(documents.as_array().unwrap().len()));
    assert_eq!(stats["activeJobs"], 1);
    assert_eq!(stats["matchesFound"], 1);
    assert_eq!(stats["processing"], 0);
}

#[tokio::test]
async fn test_upload_validation_errors() {
    let app = app(StubScorer::echo(70.0));

    let (status, body) = send(&app, upload(&[("type", "job_description")], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, upload(&[("type", "resume")], Some(("a.txt", b"x")))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        upload(&[("type", "consultant_profile")], Some(("a.txt", b"x"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        upload(&[("type", "job_description")], Some(("a.exe", b"MZ"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, documents) = send(&app, get("/api/documents")).await;
    assert!(documents.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_document_then_404() {
    let app = app(StubScorer::echo(70.0));
    let job_id = upload_job(&app, "QA Engineer").await;

    let delete = |id: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/documents/{id}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&app, delete(&job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = send(&app, delete(&job_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get(&format!("/api/documents/{job_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_analysis_rejects_missing_or_wrong_document() {
    let app = app(StubScorer::echo(70.0));
    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/analysis", json!({ "jobDescriptionId": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let job_id = upload_job(&app, "DevOps").await;
    let profile_id = upload_profile(&app, &job_id, "Bob").await;
    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/analysis", json!({ "jobDescriptionId": profile_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_scoring_leaves_empty_results() {
    let app = app(StubScorer::failing());
    let job_id = upload_job(&app, "ML Engineer").await;
    upload_profile(&app, &job_id, "Carol").await;

    let analysis = wait_for(&app, &start(&app, &job_id).await).await;
    assert_eq!(analysis["status"], "failed");
    assert_eq!(analysis["results"], json!([]));
}

#[tokio::test]
async fn test_manual_override() {
    let app = app(StubScorer::echo(65.0));
    let job_id = upload_job(&app, "Frontend Engineer").await;
    let profile_id = upload_profile(&app, &job_id, "Dana").await;
    let analysis_id = start(&app, &job_id).await;
    let analysis = wait_for(&app, &analysis_id).await;
    let before = analysis["results"].clone();
    assert_eq!(before[0]["status"], "pending");

    let uri = format!("/api/analyses/{analysis_id}/candidates/{profile_id}/status");
    let (status, _) = send(
        &app,
        json_request(Method::PATCH, &uri, json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            Method::PATCH,
            &format!("/api/analyses/{analysis_id}/candidates/ghost/status"),
            json!({ "status": "rejected" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(
            Method::PATCH,
            &format!("/api/analyses/missing/candidates/{profile_id}/status"),
            json!({ "status": "rejected" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Rejected requests leave the stored results untouched.
    let (_, analysis) = send(&app, get(&format!("/api/analyses/{analysis_id}"))).await;
    assert_eq!(analysis["results"], before);

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &uri, json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidateId"], profile_id.as_str());
    assert_eq!(body["newStatus"], "rejected");

    // Only the status field changes.
    let mut expected = before.clone();
    expected[0]["status"] = json!("rejected");
    let (_, analysis) = send(&app, get(&format!("/api/analyses/{analysis_id}"))).await;
    assert_eq!(analysis["status"], "completed");
    assert_eq!(analysis["results"], expected);

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &uri, json!({ "status": "shortlisted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newStatus"], "shortlisted");

    expected[0]["status"] = json!("shortlisted");
    let (_, analysis) = send(&app, get(&format!("/api/analyses/{analysis_id}"))).await;
    assert_eq!(analysis["results"], expected);
}

#[tokio::test]
async fn test_reverse_match_endpoint() {
    let scorer = StubScorer::echo(75.0);
    let app = app(scorer.clone());

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/reverse-match", json!({ "resumeContent": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/reverse-match", json!({ "resumeContent": "Rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "candidateSummary": "", "matches": [] }));
    assert_eq!(scorer.calls(), 0);

    upload_job(&app, "Rust Engineer").await;
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/reverse-match", json!({ "resumeContent": "Rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"][0]["jobTitle"], "Rust Engineer");
    assert_eq!(body["matches"][0]["overallScore"], 75.0);
}

#[tokio::test]
async fn test_gemini_check_requires_key() {
    let app = app(StubScorer::echo(70.0));
    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/test-gemini", json!({ "apiKey": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_notifications_follow_analysis_lifecycle() {
    let app = app(StubScorer::echo(90.0));
    let job_id = upload_job(&app, "Staff Engineer").await;
    upload_profile(&app, &job_id, "Eve").await;
    wait_for(&app, &start(&app, &job_id).await).await;

    let (_, list) = send(&app, get("/api/notifications")).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["type"], "high_similarity_match");

    let (_, count) = send(&app, get("/api/notifications/unread-count")).await;
    assert_eq!(count["count"], 3);

    let id = list[0]["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        json_request(Method::PUT, &format!("/api/notifications/{id}/read"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, count) = send(&app, get("/api/notifications/unread-count")).await;
    assert_eq!(count["count"], 2);

    let (status, _) = send(
        &app,
        json_request(Method::PUT, "/api/notifications/read-all", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, count) = send(&app, get("/api/notifications/unread-count")).await;
    assert_eq!(count["count"], 0);

    // Another user's log is untouched and empty.
    let (_, other) = send(&app, get("/api/notifications?userId=someone")).await;
    assert_eq!(other, json!([]));

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/notifications/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
}
