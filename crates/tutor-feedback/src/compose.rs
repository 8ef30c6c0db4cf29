//! Message builders for every feedback case.
//!
//! Each builder returns a fresh [`Feedback`] whose paragraphs are in final
//! display order. Only [`runtime_error`] can fail, when the trace names a
//! line the line map cannot resolve.

use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::feedback::{Feedback, FeedbackCase, Paragraph, ParagraphKind};
use crate::prereq::PrereqCheckFailure;
use crate::task::{BuggyOutputTest, CorrectnessTest, PerformanceTest};
use crate::trace::{remap_trace, SourceLineMap};
use crate::value::Value;

/// Shows the hint at `hint_index` for a detected buggy implementation.
#[must_use]
pub fn buggy_output(
    task_index: usize,
    test_index: usize,
    test: &BuggyOutputTest,
    hint_index: usize,
) -> Feedback {
    let index = hint_index.min(test.last_hint_index());
    let mut feedback = Feedback::new(FeedbackCase::BuggyOutput {
        task_index,
        test_index,
    })
    .with_hint(test.id.clone(), index);
    feedback.push_text(test.hint(index));
    feedback
}

/// Contrasts the observed output with one accepted output.
#[must_use]
pub fn correctness(
    task_index: usize,
    test_index: usize,
    test: &CorrectnessTest,
    output: &Value,
    output_function: Option<&str>,
) -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::Correctness {
        task_index,
        test_index,
    });

    let observed = match output_function {
        Some(function) => format!(
            "For the input {}, your result passed through {function}() was {output}.",
            test.input
        ),
        None => format!("For the input {}, your code returned {output}.", test.input),
    };
    feedback.push_text(observed);

    if let Some(expected) = test.representative_output() {
        feedback.push_text(format!("A correct result would be {expected}."));
    }
    feedback
}

/// Asks for a faster solution without revealing the observed class.
#[must_use]
pub fn performance(task_index: usize, test_index: usize, test: &PerformanceTest) -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::Performance {
        task_index,
        test_index,
    });
    feedback.push_text(format!(
        "Your code gives the right answers but is too slow. Try to optimize it to run in {} time.",
        test.expected
    ));
    feedback
}

/// Shows the evaluator's trace with its line reference in student terms.
///
/// # Errors
///
/// Returns `FeedbackError::LineOutOfRange` if the trace's trailing line
/// reference is outside `line_map`.
pub fn runtime_error(trace: &str, line_map: &SourceLineMap) -> Result<Feedback> {
    let remapped = remap_trace(trace, line_map)?;

    let mut feedback = Feedback::new(FeedbackCase::RuntimeError);
    feedback.push_text("Your code raised an error:");
    feedback.push_code(remapped);
    Ok(feedback)
}

/// Reports that the submission exceeded the time limit.
#[must_use]
pub fn timeout(time_limit_secs: u32) -> Feedback {
    let unit = if time_limit_secs == 1 { "second" } else { "seconds" };
    let mut feedback = Feedback::new(FeedbackCase::Timeout);
    feedback.push_text(format!(
        "Your code took longer than {time_limit_secs} {unit} to run. Check for loops that never end, or make your code faster."
    ));
    feedback
}

/// Reports unbounded recursion.
#[must_use]
pub fn infinite_recursion() -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::InfiniteRecursion);
    feedback.push_text(
        "Your code called itself too many times. Make sure every recursive call gets closer to a base case.",
    );
    feedback
}

/// Congratulates the student and marks the question complete.
#[must_use]
pub fn completion() -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::Completed);
    feedback.completed = true;
    feedback.push_text("Well done! Your code passes every test. Click Next to continue.");
    feedback
}

/// Explains a structural problem found before execution.
#[must_use]
pub fn prerequisite_failure(
    failure: &PrereqCheckFailure,
    starter_code: &str,
    config: &FeedbackConfig,
) -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::PrerequisiteFailure);

    match failure {
        PrereqCheckFailure::MissingStarterCode => {
            feedback.push_text(
                "Your code is missing a function from the starter code. Keep the function names and parameters from this template:",
            );
            feedback.push_code(starter_code);
        }
        PrereqCheckFailure::DisallowedImports { imports } => {
            feedback.push_text("Your code imports libraries that are not available here:");
            feedback.push_code(imports.join("\n"));
            feedback.push_text(format!(
                "Only these libraries are supported: {}.",
                config.supported_libraries_list()
            ));
        }
        PrereqCheckFailure::CodeOutsideFunction => {
            feedback.push_text(
                "All of your code must be inside the required function. Move any statements outside it into the function body.",
            );
        }
    }

    feedback
}

/// Wraps raw syntax error output.
#[must_use]
pub fn syntax_error(text: impl Into<String>) -> Feedback {
    let mut feedback = Feedback::new(FeedbackCase::SyntaxError);
    feedback.paragraphs.push(Paragraph {
        kind: ParagraphKind::SyntaxError,
        text: text.into(),
    });
    feedback
}
