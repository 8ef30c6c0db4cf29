//! Tutor Feedback Engine
//!
//! Turns a sandbox evaluation of a student's submission into one piece of
//! feedback: an execution-error explanation, a buggy-pattern hint, a
//! correctness or performance mismatch, or a completion message.
//!
//! Hint escalation is recovered from the previous turn's [`Snapshot`], which
//! the caller passes in explicitly. The engine itself keeps no state between
//! calls.
//!
//! # Example
//!
//! ```
//! use tutor_feedback::{
//!     BuggyOutputTest, CodeEvalResult, FeedbackEngine, Snapshot, Submission, Task, TaskResults,
//! };
//!
//! let tasks = vec![Task {
//!     buggy_output_tests: vec![BuggyOutputTest::new(
//!         "skips-first",
//!         "total_from_one",
//!         vec!["Which index does your loop start at?".into(), "Start at 0.".into()],
//!     )],
//!     ..Task::default()
//! }];
//! let engine = FeedbackEngine::default();
//!
//! let detected = |code: &str| {
//!     Submission::new(CodeEvalResult::new(
//!         code,
//!         vec![TaskResults { buggy_outputs: vec![true], ..TaskResults::default() }],
//!     ))
//! };
//!
//! let first = detected("for i in range(1, len(xs)):");
//! let feedback = engine.evaluate(&tasks, &first, None).unwrap();
//! assert_eq!(feedback.hint_index, Some(0));
//!
//! let snapshot = Snapshot::new(first.result, feedback);
//! let second = detected("for i in range(1, len(xs) + 1):");
//! let feedback = engine.evaluate(&tasks, &second, Some(&snapshot)).unwrap();
//! assert_eq!(feedback.hint_index, Some(1));
//! ```

pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod eval;
pub mod feedback;
pub mod history;
pub mod interpreter;
pub mod prereq;
pub mod question;
pub mod reinforcement;
pub mod task;
pub mod trace;
pub mod value;

pub use config::{FeedbackConfig, CONFIG_FILE_NAME};
pub use engine::{FeedbackEngine, Submission};
pub use error::{FeedbackError, Result};
pub use eval::{
    CodeEvalResult, ExecutionError, TaskResults, RECURSION_ERROR_MARKER, TIMEOUT_ERROR_MARKER,
};
pub use feedback::{Feedback, FeedbackCase, Paragraph, ParagraphKind};
pub use history::Snapshot;
pub use interpreter::select_feedback_case;
pub use prereq::PrereqCheckFailure;
pub use question::Question;
pub use reinforcement::{NoReinforcement, Reinforcement, ReinforcementSource};
pub use task::{BuggyOutputTest, ComplexityClass, CorrectnessTest, PerformanceTest, Task, TestKind};
pub use trace::{remap_trace, SourceLine, SourceLineMap, TraceLocation, HARNESS_LINE_TEXT};
pub use value::Value;
