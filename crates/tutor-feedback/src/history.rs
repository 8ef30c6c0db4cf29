//! Transcript entries consulted between turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eval::CodeEvalResult;
use crate::feedback::Feedback;

/// One past submission paired with the feedback it received.
///
/// Only the most recent snapshot is read, to continue hint escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The evaluation result of the submission.
    pub result: CodeEvalResult,

    /// The feedback produced for it.
    pub feedback: Feedback,

    /// When the snapshot was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Records `result` and `feedback` at the current time.
    #[must_use]
    pub fn new(result: CodeEvalResult, feedback: Feedback) -> Self {
        Self {
            result,
            feedback,
            recorded_at: Utc::now(),
        }
    }

    /// Returns `true` if the snapshot's feedback completed the question.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        self.feedback.completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackCase;

    #[test]
    fn test_snapshot_roundtrip() {
        let result = CodeEvalResult::failed("loop()", "TimeoutError");
        let feedback = Feedback::new(FeedbackCase::Timeout);
        let snapshot = Snapshot::new(result, feedback);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("recordedAt"));

        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert!(!restored.is_completion());
    }
}
