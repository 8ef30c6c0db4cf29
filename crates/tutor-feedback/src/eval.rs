//! Code evaluation results as reported by the execution sandbox.

use serde::{Deserialize, Serialize};

use crate::task::ComplexityClass;
use crate::value::Value;

/// Prefix the sandbox puts on errors caused by the execution time limit.
pub const TIMEOUT_ERROR_MARKER: &str = "TimeoutError";

/// Prefix the sandbox puts on errors caused by unbounded recursion.
pub const RECURSION_ERROR_MARKER: &str = "RecursionError";

/// Message fragment of a recursion-depth error raised without the prefix.
const RECURSION_DEPTH_MESSAGE: &str = "maximum recursion depth exceeded";

/// Outcome of running one submission against every task's tests.
///
/// When `error` is present the per-task results are not consulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEvalResult {
    /// Error raised while executing the submission, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Extra value attached to the error by the sandbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_context: Option<Value>,

    /// Source text that was actually executed, harness included.
    #[serde(default)]
    pub preprocessed_code: String,

    /// Per-task results, aligned with the evaluated task list.
    #[serde(default)]
    pub task_results: Vec<TaskResults>,
}

impl CodeEvalResult {
    /// Creates a successful run of `preprocessed_code` with the given results.
    #[must_use]
    pub fn new(preprocessed_code: impl Into<String>, task_results: Vec<TaskResults>) -> Self {
        Self {
            error: None,
            error_context: None,
            preprocessed_code: preprocessed_code.into(),
            task_results,
        }
    }

    /// Creates a failed run of `preprocessed_code`.
    #[must_use]
    pub fn failed(preprocessed_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            error_context: None,
            preprocessed_code: preprocessed_code.into(),
            task_results: Vec::new(),
        }
    }

    /// Classifies the execution error, if there was one.
    #[must_use]
    pub fn execution_error(&self) -> Option<ExecutionError> {
        self.error.as_deref().map(ExecutionError::classify)
    }
}

/// Results for one task, positionally aligned with the task's tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResults {
    /// `true` where the submission behaves like the buggy reference.
    #[serde(default)]
    pub buggy_outputs: Vec<bool>,

    /// Observed output for each correctness test input.
    #[serde(default)]
    pub correctness_outputs: Vec<Value>,

    /// Observed class for each performance test.
    #[serde(default)]
    pub performance_classes: Vec<ComplexityClass>,
}

/// An execution failure, classified once at the sandbox boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The submission exceeded the execution time limit.
    Timeout,
    /// The submission recursed without bound.
    InfiniteRecursion,
    /// Any other runtime error, with the evaluator's trace text.
    Runtime(String),
}

impl ExecutionError {
    /// Classifies a raw sandbox error string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutor_feedback::ExecutionError;
    ///
    /// assert_eq!(ExecutionError::classify("TimeoutError: 5s"), ExecutionError::Timeout);
    /// assert!(matches!(
    ///     ExecutionError::classify("ZeroDivisionError: division by zero on line 3"),
    ///     ExecutionError::Runtime(_)
    /// ));
    /// ```
    #[must_use]
    pub fn classify(error: &str) -> Self {
        if error.starts_with(TIMEOUT_ERROR_MARKER) {
            Self::Timeout
        } else if error.starts_with(RECURSION_ERROR_MARKER)
            || error.contains(RECURSION_DEPTH_MESSAGE)
        {
            Self::InfiniteRecursion
        } else {
            Self::Runtime(error.to_string())
        }
    }
}
