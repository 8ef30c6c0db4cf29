//! Error types for the tutor feedback engine.
//!
//! Two families live here. User-correctable problems (configuration and
//! question content) carry a suggestion line. Contract violations (bad line
//! maps, misaligned result arrays, impossible prerequisite reports) point at
//! a defect in an upstream collaborator and must abort feedback generation
//! instead of being shown to the student.

use std::path::PathBuf;

use crate::task::TestKind;

/// A specialized `Result` type for feedback engine operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Errors that can occur while loading content or generating feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your tutor.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Question Content Errors
    // ========================================================================
    /// Question file was not found at the specified path.
    #[error("Question not found: '{path}'\n\nSuggestion: Check the path passed with --question")]
    QuestionNotFound {
        /// Path where the question was expected.
        path: PathBuf,
    },

    /// Question file exceeds the configured size limit.
    #[error("Question exceeds size limit ({limit_kb}KB): '{path}' is {size_kb}KB\n\nSuggestion: Split the question into smaller exercises or raise maxQuestionSizeKb")]
    QuestionTooLarge {
        /// Path to the oversized question.
        path: PathBuf,
        /// Actual size in kilobytes.
        size_kb: u64,
        /// Configured limit in kilobytes.
        limit_kb: u64,
    },

    /// Question file contains non-UTF-8 content.
    #[error("Question has invalid encoding: '{path}'\n\nSuggestion: Convert the file to UTF-8 encoding")]
    QuestionEncodingError {
        /// Path to the question with encoding issues.
        path: PathBuf,
    },

    /// Question content breaks a structural invariant.
    #[error("Invalid question content: {message}\n\nSuggestion: {suggestion}")]
    InvalidQuestion {
        /// Description of the broken invariant.
        message: String,
        /// Actionable suggestion for the content author.
        suggestion: String,
    },

    // ========================================================================
    // Contract Violations
    // ========================================================================
    /// The evaluator reported a line that the source line map cannot resolve.
    #[error("Line {line} is outside the source line map ({map_len} executed lines)")]
    LineOutOfRange {
        /// The 1-based line number reported by the evaluator.
        line: usize,
        /// Number of entries in the line map.
        map_len: usize,
    },

    /// A task's result array does not line up with its test sequence.
    #[error("Task {task_index}: expected {expected} {kind} results, got {actual}")]
    ResultMisaligned {
        /// Index of the offending task.
        task_index: usize,
        /// Which test sequence is misaligned.
        kind: TestKind,
        /// Number of tests in the task.
        expected: usize,
        /// Number of results reported.
        actual: usize,
    },

    /// The evaluation result covers a different number of tasks.
    #[error("Evaluation result covers {actual} tasks but {expected} were evaluated")]
    TaskCountMismatch {
        /// Number of tasks passed to the interpreter.
        expected: usize,
        /// Number of per-task result entries.
        actual: usize,
    },

    /// The static check reported no prerequisite failure at all.
    #[error("Prerequisite feedback requested but the static check reported no failure")]
    NoPrerequisiteFailure,

    /// The static check reported several failures that should be exclusive.
    #[error("Static check reported {count} prerequisite failures; exactly one is expected")]
    ConflictingPrerequisiteFailures {
        /// Number of failure indications received.
        count: usize,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedbackError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `QuestionNotFound` error.
    #[must_use]
    pub fn question_not_found(path: impl Into<PathBuf>) -> Self {
        Self::QuestionNotFound { path: path.into() }
    }

    /// Creates a new `QuestionTooLarge` error.
    #[must_use]
    pub fn question_too_large(path: impl Into<PathBuf>, size_kb: u64, limit_kb: u64) -> Self {
        Self::QuestionTooLarge {
            path: path.into(),
            size_kb,
            limit_kb,
        }
    }

    /// Creates a new `QuestionEncodingError`.
    #[must_use]
    pub fn question_encoding(path: impl Into<PathBuf>) -> Self {
        Self::QuestionEncodingError { path: path.into() }
    }

    /// Creates a new `InvalidQuestion` error.
    #[must_use]
    pub fn invalid_question(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidQuestion {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `LineOutOfRange` error.
    #[must_use]
    pub const fn line_out_of_range(line: usize, map_len: usize) -> Self {
        Self::LineOutOfRange { line, map_len }
    }

    /// Creates a new `ResultMisaligned` error.
    #[must_use]
    pub const fn result_misaligned(
        task_index: usize,
        kind: TestKind,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::ResultMisaligned {
            task_index,
            kind,
            expected,
            actual,
        }
    }

    /// Returns `true` if this error signals a defect in an upstream
    /// collaborator rather than a user-correctable condition.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::LineOutOfRange { .. }
                | Self::ResultMisaligned { .. }
                | Self::TaskCountMismatch { .. }
                | Self::NoPrerequisiteFailure
                | Self::ConflictingPrerequisiteFailures { .. }
        )
    }
}
