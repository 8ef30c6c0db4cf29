//! Integration tests for the session HTTP API.
//!
//! Each test drives a router over several requests, the way a tutor front end
//! would across a student's attempts.

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use tutor_feedback::{FeedbackConfig, FeedbackEngine};
use tutor_session::{create_router, AppState};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn question_json() -> Value {
    let contents = std::fs::read_to_string(fixture_path().join("sum-list.json"))
        .expect("Failed to read question fixture");
    serde_json::from_str(&contents).expect("Invalid question fixture")
}

fn test_router() -> Router {
    let config = FeedbackConfig::load_from_dir(&fixture_path()).expect("Failed to load config");
    create_router(AppState::new(FeedbackEngine::new(config)))
}

/// Sends one request and returns the status with the parsed JSON body.
async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn open_session(router: &Router) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/sessions",
        Some(json!({ "question": question_json() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["sessionId"].as_str().unwrap().to_string()
}

/// A submission for the fixture question.
fn submission(code: &str, skips_first: bool) -> Value {
    let first_output = if skips_first { 5 } else { 6 };
    json!({
        "result": {
            "preprocessedCode": code,
            "taskResults": [
                {
                    "buggyOutputs": [skips_first],
                    "correctnessOutputs": [first_output, 0],
                    "performanceClasses": ["O(n)"]
                },
                { "correctnessOutputs": ["Total: 4"] }
            ]
        }
    })
}

#[tokio::test]
async fn test_full_session_until_completion() {
    let router = test_router();
    let id = open_session(&router).await;
    let uri = format!("/api/sessions/{id}/submissions");

    let (status, feedback) =
        send(&router, Method::POST, &uri, Some(submission("S1", true))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["hintIndex"], 0);
    assert_eq!(feedback["bugId"], "skips-first");

    let (_, feedback) = send(&router, Method::POST, &uri, Some(submission("S2", true))).await;
    assert_eq!(feedback["hintIndex"], 1);

    let (_, feedback) = send(&router, Method::POST, &uri, Some(submission("S3", true))).await;
    assert_eq!(feedback["hintIndex"], 1);

    let (_, feedback) = send(&router, Method::POST, &uri, Some(submission("S4", false))).await;
    assert_eq!(feedback["completed"], true);
    assert_eq!(feedback["case"]["type"], "completed");

    let (status, session) = send(&router, Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["status"], "completed");
    assert_eq!(session["history"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unchanged_resubmission_keeps_hint() {
    let router = test_router();
    let id = open_session(&router).await;
    let uri = format!("/api/sessions/{id}/submissions");

    send(&router, Method::POST, &uri, Some(submission("S1", true))).await;
    let (_, feedback) = send(&router, Method::POST, &uri, Some(submission("S2", true))).await;
    assert_eq!(feedback["hintIndex"], 1);

    let (_, again) = send(&router, Method::POST, &uri, Some(submission("S2", true))).await;
    assert_eq!(again["hintIndex"], 1);
    assert_eq!(again["paragraphs"], feedback["paragraphs"]);
}

#[tokio::test]
async fn test_syntax_error_turn_resets_escalation() {
    let router = test_router();
    let id = open_session(&router).await;
    let uri = format!("/api/sessions/{id}/submissions");

    send(&router, Method::POST, &uri, Some(submission("S1", true))).await;

    let (status, feedback) = send(
        &router,
        Method::POST,
        &format!("/api/sessions/{id}/syntax-error"),
        Some(json!({ "message": "SyntaxError: invalid syntax", "code": "def total(xs)" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["paragraphs"][0]["kind"], "syntax_error");

    let (_, feedback) = send(&router, Method::POST, &uri, Some(submission("S2", true))).await;
    assert_eq!(feedback["hintIndex"], 0);
}

#[tokio::test]
async fn test_disallowed_import_lists_configured_libraries() {
    let router = test_router();
    let id = open_session(&router).await;

    let (status, feedback) = send(
        &router,
        Method::POST,
        &format!("/api/sessions/{id}/prerequisite-failure"),
        Some(json!({
            "failure": { "type": "disallowed_imports", "imports": ["numpy"] },
            "code": "import numpy"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["paragraphs"][1]["text"], "numpy");
    assert_eq!(
        feedback["paragraphs"][2]["text"],
        "Only these libraries are supported: math, itertools."
    );
}

#[tokio::test]
async fn test_timeout_reports_configured_limit() {
    let router = test_router();
    let id = open_session(&router).await;

    let (status, feedback) = send(
        &router,
        Method::POST,
        &format!("/api/sessions/{id}/submissions"),
        Some(json!({
            "result": { "error": "TimeoutError", "preprocessedCode": "while True: pass" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["case"]["type"], "timeout");
    assert!(feedback["paragraphs"][0]["text"]
        .as_str()
        .unwrap()
        .contains("2 seconds"));
}

#[tokio::test]
async fn test_unmappable_runtime_error_returns_500() {
    let router = test_router();
    let id = open_session(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/sessions/{id}/submissions"),
        Some(json!({
            "result": { "error": "IndexError on line 12", "preprocessedCode": "x = 1" },
            "lineMap": [1]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Line 12"));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let router = test_router();
    let first = open_session(&router).await;
    let second = open_session(&router).await;

    send(
        &router,
        Method::POST,
        &format!("/api/sessions/{first}/submissions"),
        Some(submission("S1", true)),
    )
    .await;
    let (_, feedback) = send(
        &router,
        Method::POST,
        &format!("/api/sessions/{second}/submissions"),
        Some(submission("S2", true)),
    )
    .await;

    assert_eq!(feedback["hintIndex"], 0);
}
