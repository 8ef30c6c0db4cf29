//! Picks the single feedback case for an evaluation result.
//!
//! Execution errors are handled first and make the per-task results
//! irrelevant. Otherwise tasks are scanned in order and, within each task,
//! buggy-output tests come before correctness tests, which come before
//! performance tests. The first failure wins.

use tracing::debug;

use crate::compose;
use crate::config::FeedbackConfig;
use crate::error::{FeedbackError, Result};
use crate::escalation;
use crate::eval::{CodeEvalResult, ExecutionError, TaskResults};
use crate::feedback::Feedback;
use crate::history::Snapshot;
use crate::task::{Task, TestKind};
use crate::trace::SourceLineMap;

/// Selects and composes the feedback for one evaluation result.
///
/// `previous` is the most recent snapshot of the session, used only to
/// continue hint escalation.
///
/// # Errors
///
/// Returns a contract violation if the result does not line up with
/// `tasks` or if a runtime error names a line outside `line_map`.
pub fn select_feedback_case(
    tasks: &[Task],
    result: &CodeEvalResult,
    line_map: &SourceLineMap,
    previous: Option<&Snapshot>,
    config: &FeedbackConfig,
) -> Result<Feedback> {
    if let Some(error) = result.execution_error() {
        debug!(
            error = ?error,
            context = ?result.error_context,
            "Submission failed to execute"
        );
        return match error {
            ExecutionError::Timeout => Ok(compose::timeout(config.time_limit_secs)),
            ExecutionError::InfiniteRecursion => Ok(compose::infinite_recursion()),
            ExecutionError::Runtime(trace) => compose::runtime_error(&trace, line_map),
        };
    }

    if result.task_results.len() != tasks.len() {
        return Err(FeedbackError::TaskCountMismatch {
            expected: tasks.len(),
            actual: result.task_results.len(),
        });
    }

    // Every task must line up before any failure is reported.
    for (task_index, (task, results)) in tasks.iter().zip(&result.task_results).enumerate() {
        check_alignment(task_index, task, results)?;
    }

    for (task_index, (task, results)) in tasks.iter().zip(&result.task_results).enumerate() {
        if let Some(feedback) = first_failure(task_index, task, results, result, previous) {
            debug!(
                task = %task.label(task_index),
                case = ?feedback.case,
                hint_index = ?feedback.hint_index,
                "Selected feedback case"
            );
            return Ok(feedback);
        }
    }

    debug!(tasks = tasks.len(), "All tasks satisfied");
    Ok(compose::completion())
}

/// Returns the feedback for the first failing test of one task.
fn first_failure(
    task_index: usize,
    task: &Task,
    results: &TaskResults,
    result: &CodeEvalResult,
    previous: Option<&Snapshot>,
) -> Option<Feedback> {
    let buggy = task
        .buggy_output_tests
        .iter()
        .zip(&results.buggy_outputs)
        .position(|(_, &detected)| detected);
    if let Some(test_index) = buggy {
        let test = &task.buggy_output_tests[test_index];
        let hint_index = escalation::hint_index(test, &result.preprocessed_code, previous);
        return Some(compose::buggy_output(task_index, test_index, test, hint_index));
    }

    let wrong = task
        .correctness_tests
        .iter()
        .zip(&results.correctness_outputs)
        .enumerate()
        .find(|(_, (test, output))| !test.matches(output));
    if let Some((test_index, (test, output))) = wrong {
        return Some(compose::correctness(
            task_index,
            test_index,
            test,
            output,
            task.output_function.as_deref(),
        ));
    }

    let slow = task
        .performance_tests
        .iter()
        .zip(&results.performance_classes)
        .enumerate()
        .find(|(_, (test, observed))| !test.matches(**observed));
    if let Some((test_index, (test, observed))) = slow {
        debug!(expected = %test.expected, observed = %observed, "Performance mismatch");
        return Some(compose::performance(task_index, test_index, test));
    }

    None
}

fn check_alignment(task_index: usize, task: &Task, results: &TaskResults) -> Result<()> {
    let checks = [
        (
            TestKind::BuggyOutput,
            task.buggy_output_tests.len(),
            results.buggy_outputs.len(),
        ),
        (
            TestKind::Correctness,
            task.correctness_tests.len(),
            results.correctness_outputs.len(),
        ),
        (
            TestKind::Performance,
            task.performance_tests.len(),
            results.performance_classes.len(),
        ),
    ];

    for (kind, expected, actual) in checks {
        if expected != actual {
            return Err(FeedbackError::result_misaligned(
                task_index, kind, expected, actual,
            ));
        }
    }
    Ok(())
}
