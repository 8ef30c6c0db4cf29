//! Hint escalation for repeated buggy-output detections.
//!
//! No counter is persisted. The hint level is recovered from the previous
//! turn's feedback: the same bug seen again after a code change moves one
//! hint forward, an unchanged resubmission keeps the level, and any other
//! bug starts over at the first hint.

use crate::history::Snapshot;
use crate::task::BuggyOutputTest;

/// Chooses the hint index for a buggy-output detection of `test`.
///
/// The result is always a valid index into `test.hints` when the hint list
/// is non-empty.
#[must_use]
pub fn hint_index(test: &BuggyOutputTest, current_code: &str, previous: Option<&Snapshot>) -> usize {
    let Some(previous) = previous else {
        return 0;
    };

    let feedback = &previous.feedback;
    let Some(previous_index) = feedback.hint_index else {
        return 0;
    };

    if feedback.bug_id.as_deref() != Some(test.id.as_str()) {
        return 0;
    }

    let last = test.last_hint_index();
    let unchanged = previous.result.preprocessed_code == current_code;

    if unchanged || previous_index >= last {
        previous_index.min(last)
    } else {
        previous_index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::CodeEvalResult;
    use crate::feedback::{Feedback, FeedbackCase};

    fn bug(id: &str, hint_count: usize) -> BuggyOutputTest {
        let hints = (0..hint_count).map(|i| format!("h{i}")).collect();
        BuggyOutputTest::new(id, "reference", hints)
    }

    fn hinted(code: &str, bug_id: &str, index: usize) -> Snapshot {
        let feedback = Feedback::new(FeedbackCase::BuggyOutput {
            task_index: 0,
            test_index: 0,
        })
        .with_hint(bug_id, index);
        Snapshot::new(CodeEvalResult::new(code, vec![]), feedback)
    }

    #[test]
    fn test_no_previous_starts_at_zero() {
        assert_eq!(hint_index(&bug("b", 3), "s1", None), 0);
    }

    #[test]
    fn test_previous_without_hint_starts_at_zero() {
        let previous = Snapshot::new(
            CodeEvalResult::new("s1", vec![]),
            Feedback::new(FeedbackCase::Correctness {
                task_index: 0,
                test_index: 0,
            }),
        );
        assert_eq!(hint_index(&bug("b", 3), "s2", Some(&previous)), 0);
    }

    #[test]
    fn test_same_bug_new_code_advances() {
        let previous = hinted("s1", "b", 0);
        assert_eq!(hint_index(&bug("b", 3), "s2", Some(&previous)), 1);

        let previous = hinted("s2", "b", 1);
        assert_eq!(hint_index(&bug("b", 3), "s3", Some(&previous)), 2);
    }

    #[test]
    fn test_same_bug_unchanged_code_is_idempotent() {
        let previous = hinted("s1", "b", 1);
        assert_eq!(hint_index(&bug("b", 3), "s1", Some(&previous)), 1);
    }

    #[test]
    fn test_exhausted_hints_stay_on_last() {
        let previous = hinted("s2", "b", 1);
        assert_eq!(hint_index(&bug("b", 2), "s3", Some(&previous)), 1);
    }

    #[test]
    fn test_stale_index_is_clamped() {
        let previous = hinted("s1", "b", 7);
        assert_eq!(hint_index(&bug("b", 2), "s1", Some(&previous)), 1);
    }

    #[test]
    fn test_different_bug_resets() {
        let previous = hinted("s1", "a", 1);
        assert_eq!(hint_index(&bug("b", 3), "s2", Some(&previous)), 0);
    }

    #[test]
    fn test_shared_hint_text_does_not_link_bugs() {
        let first = BuggyOutputTest::new("a", "ref_a", vec!["Check the loop bounds".to_string()]);
        let second = BuggyOutputTest::new(
            "b",
            "ref_b",
            vec!["Check the loop bounds".to_string(), "More detail".to_string()],
        );

        let mut previous = hinted("s1", &first.id, 0);
        previous.feedback.push_text(first.hint(0));

        assert_eq!(hint_index(&second, "s2", Some(&previous)), 0);
    }
}
