//! Session state types.
//!
//! A session is one student working on one question. Its transcript is the
//! ordered list of snapshots; only the last one feeds back into the engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_feedback::{Question, Snapshot};

/// Number of most recent turns a session keeps in its transcript.
pub const HISTORY_LIMIT: usize = 50;

// ============================================================================
// SessionStatus
// ============================================================================

/// Progress of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The student is still working.
    #[default]
    Active,
    /// A submission passed every task.
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// One student's work on one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier.
    pub id: String,

    /// The question being worked on.
    pub question: Question,

    /// The most recent turns, oldest first, at most [`HISTORY_LIMIT`].
    pub history: Vec<Snapshot>,

    /// Number of turns recorded over the session's lifetime.
    #[serde(default)]
    pub turn_count: usize,

    /// Current progress.
    pub status: SessionStatus,

    /// When the session started.
    pub started_at: DateTime<Utc>,

    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an active session with an empty transcript.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutor_feedback::Question;
    /// use tutor_session::{Session, SessionStatus};
    ///
    /// let session = Session::new("s-1", Question::default());
    /// assert_eq!(session.status, SessionStatus::Active);
    /// assert!(session.last_snapshot().is_none());
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, question: Question) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            question,
            history: Vec::new(),
            turn_count: 0,
            status: SessionStatus::Active,
            started_at: now,
            updated_at: now,
        }
    }

    /// Returns the most recent turn, if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    /// Appends a turn to the transcript, dropping the oldest turns beyond
    /// [`HISTORY_LIMIT`].
    ///
    /// The session becomes `Completed` the first time a completing turn is
    /// recorded and stays that way.
    pub fn record(&mut self, snapshot: Snapshot) {
        if snapshot.is_completion() {
            self.status = SessionStatus::Completed;
        }
        self.history.push(snapshot);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.turn_count += 1;
        self.touch();
    }

    /// Number of recorded turns, including those no longer in the transcript.
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turn_count
    }

    /// Updates the `updated_at` timestamp to the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tutor_feedback::{compose, CodeEvalResult};

    use super::*;

    #[test]
    fn test_record_appends_and_touches() {
        let mut session = Session::new("s-1", Question::default());
        let before = session.updated_at;

        session.record(Snapshot::new(
            CodeEvalResult::failed("x", "TimeoutError"),
            compose::timeout(5),
        ));

        assert_eq!(session.turns(), 1);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.updated_at >= before);
        assert!(session.last_snapshot().is_some());
    }

    #[test]
    fn test_completion_is_sticky() {
        let mut session = Session::new("s-1", Question::default());
        session.record(Snapshot::new(CodeEvalResult::default(), compose::completion()));
        assert_eq!(session.status, SessionStatus::Completed);

        session.record(Snapshot::new(
            CodeEvalResult::default(),
            compose::syntax_error("bad"),
        ));
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.turns(), 2);
    }

    #[test]
    fn test_transcript_keeps_latest_turns() {
        let mut session = Session::new("s-1", Question::default());
        for turn in 0..=HISTORY_LIMIT {
            session.record(Snapshot::new(
                CodeEvalResult::failed(format!("turn {turn}"), "TimeoutError"),
                compose::timeout(5),
            ));
        }

        assert_eq!(session.turns(), HISTORY_LIMIT + 1);
        assert_eq!(session.history.len(), HISTORY_LIMIT);
        assert_eq!(session.history[0].result.preprocessed_code, "turn 1");
        assert_eq!(
            session.last_snapshot().unwrap().result.preprocessed_code,
            format!("turn {HISTORY_LIMIT}")
        );
    }

    #[test]
    fn test_status_display_and_serialization() {
        assert_eq!(SessionStatus::Active.to_string(), "active");
        assert_eq!(
            serde_json::to_string(&SessionStatus::Completed).unwrap(),
            r#""completed""#
        );
    }

    #[test]
    fn test_session_serialization() {
        let session = Session::new("s-9", Question::default());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], "s-9");
        assert_eq!(json["status"], "active");
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!(json.get("startedAt").is_some());
    }
}
