//! Feedback values returned to callers.

use serde::{Deserialize, Serialize};

use crate::reinforcement::Reinforcement;

/// How a paragraph should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    /// Prose.
    Text,
    /// A code block or listing.
    Code,
    /// Raw syntax error output.
    SyntaxError,
}

/// One paragraph of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Presentation kind.
    pub kind: ParagraphKind,
    /// Paragraph content.
    pub text: String,
}

impl Paragraph {
    /// Creates a prose paragraph.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ParagraphKind::Text,
            text: text.into(),
        }
    }

    /// Creates a code paragraph.
    #[must_use]
    pub fn code(text: impl Into<String>) -> Self {
        Self {
            kind: ParagraphKind::Code,
            text: text.into(),
        }
    }
}

/// Which feedback case produced a [`Feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackCase {
    /// Every task is satisfied.
    Completed,
    /// The submission matched a known buggy implementation.
    BuggyOutput {
        /// Index of the task.
        task_index: usize,
        /// Index of the buggy-output test within the task.
        test_index: usize,
    },
    /// The submission returned a wrong output.
    Correctness {
        /// Index of the task.
        task_index: usize,
        /// Index of the correctness test within the task.
        test_index: usize,
    },
    /// The submission has the wrong asymptotic behaviour.
    Performance {
        /// Index of the task.
        task_index: usize,
        /// Index of the performance test within the task.
        test_index: usize,
    },
    /// The submission ran out of time.
    Timeout,
    /// The submission recursed without bound.
    InfiniteRecursion,
    /// The submission raised a runtime error.
    RuntimeError,
    /// The submission could not be parsed.
    SyntaxError,
    /// The submission failed a structural check before execution.
    PrerequisiteFailure,
}

impl FeedbackCase {
    /// Returns `true` for cases caused by an execution error.
    #[must_use]
    pub const fn is_execution_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::InfiniteRecursion | Self::RuntimeError
        )
    }
}

/// Feedback for one submission.
///
/// Built fresh for every turn. Callers store it with the evaluation result
/// so the next turn can continue hint escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// The case that produced this feedback.
    pub case: FeedbackCase,

    /// Paragraphs in display order.
    pub paragraphs: Vec<Paragraph>,

    /// `true` when every task is satisfied.
    pub completed: bool,

    /// Hint level used, for buggy-output feedback only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_index: Option<usize>,

    /// Identifier of the bug the hint was chosen for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug_id: Option<String>,

    /// Follow-up suggestion attached by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reinforcement: Option<Reinforcement>,
}

impl Feedback {
    /// Creates empty feedback for `case`.
    #[must_use]
    pub const fn new(case: FeedbackCase) -> Self {
        Self {
            case,
            paragraphs: Vec::new(),
            completed: false,
            hint_index: None,
            bug_id: None,
            reinforcement: None,
        }
    }

    /// Appends a prose paragraph.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.paragraphs.push(Paragraph::text(text));
    }

    /// Appends a code paragraph.
    pub fn push_code(&mut self, text: impl Into<String>) {
        self.paragraphs.push(Paragraph::code(text));
    }

    /// Records the hint level used for `bug_id`.
    #[must_use]
    pub fn with_hint(mut self, bug_id: impl Into<String>, index: usize) -> Self {
        self.bug_id = Some(bug_id.into());
        self.hint_index = Some(index);
        self
    }

    /// Returns `true` if this feedback revealed a hint.
    #[must_use]
    pub const fn is_hint(&self) -> bool {
        self.hint_index.is_some()
    }
}
