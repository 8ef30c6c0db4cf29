//! Tutor Session Service
//!
//! Keeps in-memory transcripts of students working on questions and serves
//! the feedback engine over HTTP.

pub mod api;
pub mod error;
pub mod session;
pub mod store;

pub use api::{
    create_router, AppState, CreateSessionRequest, CreateSessionResponse, ErrorResponse,
    PrerequisiteFailureRequest, SyntaxErrorRequest,
};
pub use error::{Result, SessionError};
pub use session::{Session, SessionStatus, HISTORY_LIMIT};
pub use store::SessionStore;
