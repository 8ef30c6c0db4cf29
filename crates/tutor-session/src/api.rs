//! HTTP API for tutoring sessions.
//!
//! # Endpoints
//!
//! - `POST /api/sessions` - Open a session for a question
//! - `GET /api/sessions/:id` - Get session state and transcript
//! - `DELETE /api/sessions/:id` - Close a session
//! - `POST /api/sessions/:id/submissions` - Evaluate a sandbox result
//! - `POST /api/sessions/:id/syntax-error` - Report a submission that did not parse
//! - `POST /api/sessions/:id/prerequisite-failure` - Report a failed static check
//!
//! # Example
//!
//! ```no_run
//! use tutor_feedback::{FeedbackConfig, FeedbackEngine};
//! use tutor_session::{create_router, AppState};
//!
//! # async fn example() {
//! let state = AppState::new(FeedbackEngine::new(FeedbackConfig::default()));
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tutor_feedback::{
    CodeEvalResult, Feedback, FeedbackEngine, PrereqCheckFailure, Question, Snapshot, Submission,
};

use crate::error::SessionError;
use crate::session::Session;
use crate::store::SessionStore;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    /// The question to work on.
    pub question: Question,
}

/// Response body for opening a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// Identifier of the new session.
    pub session_id: String,
}

/// Request body for the syntax error endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxErrorRequest {
    /// Raw parser output.
    pub message: String,
    /// The submitted source, if the caller has it.
    #[serde(default)]
    pub code: String,
}

/// Request body for the prerequisite failure endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PrerequisiteFailureRequest {
    /// The failure found by the static check.
    pub failure: PrereqCheckFailure,
    /// The submitted source, if the caller has it.
    #[serde(default)]
    pub code: String,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Engine used for every session.
    pub engine: FeedbackEngine,
    /// Open sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Creates a new `AppState` with an empty session store.
    #[must_use]
    pub fn new(engine: FeedbackEngine) -> Self {
        Self {
            engine,
            sessions: SessionStore::new(),
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// No session with the requested id.
    NotFound(String),
    /// The request content was rejected.
    BadRequest(String),
    /// An upstream collaborator sent inconsistent data.
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SessionNotFound { .. } => Self::NotFound(err.to_string()),
            SessionError::Feedback(ref inner) if inner.is_contract_violation() => {
                error!(error = %inner, "Feedback generation aborted");
                Self::Internal(err.to_string())
            }
            SessionError::Feedback(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// All routes are nested under `/api`, with permissive CORS and request
/// tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", post(handle_create_session))
        .route(
            "/sessions/:id",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/sessions/:id/submissions", post(handle_submission))
        .route("/sessions/:id/syntax-error", post(handle_syntax_error))
        .route(
            "/sessions/:id/prerequisite-failure",
            post(handle_prerequisite_failure),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /api/sessions`.
async fn handle_create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let session_id = state.sessions.create(request.question).await.map_err(|e| {
        warn!(error = %e, "Rejected question");
        ApiError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// Handler for `GET /api/sessions/:id`.
async fn handle_get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions.get(&id).await?))
}

/// Handler for `DELETE /api/sessions/:id`.
async fn handle_delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `POST /api/sessions/:id/submissions`.
///
/// Evaluates the submission against the session's question, continuing
/// hint escalation from the previous turn, and records the new turn.
async fn handle_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(submission): Json<Submission>,
) -> Result<Json<Feedback>, ApiError> {
    info!(session = %id, "Received submission");

    let feedback = state
        .sessions
        .update(&id, |session| {
            let feedback = state.engine.evaluate(
                &session.question.tasks,
                &submission,
                session.last_snapshot(),
            )?;
            session.record(Snapshot::new(submission.result.clone(), feedback.clone()));

            info!(
                session = %session.id,
                turn = session.turns(),
                status = %session.status,
                "Submission recorded"
            );
            Ok(feedback)
        })
        .await?;

    Ok(Json(feedback))
}

/// Handler for `POST /api/sessions/:id/syntax-error`.
async fn handle_syntax_error(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SyntaxErrorRequest>,
) -> Result<Json<Feedback>, ApiError> {
    info!(session = %id, "Received syntax error");

    let feedback = state.engine.syntax_error(request.message.clone());
    let result = CodeEvalResult::failed(request.code, request.message);
    record(&state, &id, result, feedback).await
}

/// Handler for `POST /api/sessions/:id/prerequisite-failure`.
async fn handle_prerequisite_failure(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PrerequisiteFailureRequest>,
) -> Result<Json<Feedback>, ApiError> {
    info!(session = %id, failure = ?request.failure, "Received prerequisite failure");

    let starter_code = state.sessions.get(&id).await?.question.starter_code;
    let feedback = state
        .engine
        .prerequisite_failure(&request.failure, &starter_code);
    let result = CodeEvalResult::new(request.code, Vec::new());
    record(&state, &id, result, feedback).await
}

/// Records a turn that did not go through the interpreter.
async fn record(
    state: &AppState,
    id: &str,
    result: CodeEvalResult,
    feedback: Feedback,
) -> Result<Json<Feedback>, ApiError> {
    state
        .sessions
        .update(id, |session| {
            session.record(Snapshot::new(result, feedback.clone()));
            Ok(())
        })
        .await?;
    Ok(Json(feedback))
}

// ============================================================================
// Tests
// ============================================================================
