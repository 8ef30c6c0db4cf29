//! Error types for tutoring sessions.

use tutor_feedback::FeedbackError;

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while running a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists with the given id.
    #[error("Session not found: '{id}'")]
    SessionNotFound {
        /// The requested session id.
        id: String,
    },

    /// The feedback engine rejected the request.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

impl SessionError {
    /// Creates a new `SessionNotFound` error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Returns `true` if the error was caused by the caller's input rather
    /// than by a defect upstream.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::SessionNotFound { .. } => true,
            Self::Feedback(err) => !err.is_contract_violation(),
        }
    }
}
