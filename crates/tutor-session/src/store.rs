//! In-memory session storage.
//!
//! Sessions live only as long as the process. Each operation takes the lock
//! once, so reading the previous turn and recording the new one cannot
//! interleave with another submission to the same session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tutor_feedback::Question;

use crate::error::{Result, SessionError};
use crate::session::Session;

/// Shared map of sessions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `question` and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Feedback` if the question breaks a content
    /// invariant.
    pub async fn create(&self, question: Question) -> Result<String> {
        question.validate()?;

        let sequence = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("s-{sequence}");

        info!(session = %id, question = %question.id, "Session created");
        self.sessions
            .lock()
            .await
            .insert(id.clone(), Session::new(id.clone(), question));
        Ok(id)
    }

    /// Returns a copy of the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionNotFound` if no session has this id.
    pub async fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::not_found(id))
    }

    /// Runs `f` against the session while holding the lock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionNotFound` if no session has this id, or
    /// whatever `f` returns.
    pub async fn update<T, F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::not_found(id))?;
        f(session)
    }

    /// Closes the session and returns its final state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionNotFound` if no session has this id.
    pub async fn remove(&self, id: &str) -> Result<Session> {
        let session = self
            .sessions
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| SessionError::not_found(id))?;

        info!(session = %id, turns = session.turns(), "Session closed");
        Ok(session)
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Returns `true` if no session is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
