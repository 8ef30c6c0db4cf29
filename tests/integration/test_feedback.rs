//! End-to-end tests for the feedback engine.
//!
//! These tests load the fixture question and config from disk and replay
//! multi-turn submissions the way a session would.

use std::path::PathBuf;

use tutor_feedback::{
    CodeEvalResult, ComplexityClass, FeedbackCase, FeedbackConfig, FeedbackEngine, Question,
    Reinforcement, Snapshot, SourceLineMap, Submission, Task, TaskResults, Value,
    HARNESS_LINE_TEXT,
};

/// Path to the fixtures directory.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn load_question() -> Question {
    Question::load(fixture_path().join("sum-list.json"), 256).expect("Failed to load question")
}

fn load_config() -> FeedbackConfig {
    FeedbackConfig::load_from_dir(&fixture_path()).expect("Failed to load config")
}

/// Results for the fixture question with every test passing.
fn passing_results() -> Vec<TaskResults> {
    vec![
        TaskResults {
            buggy_outputs: vec![false],
            correctness_outputs: vec![Value::Int(6), Value::Int(0)],
            performance_classes: vec![ComplexityClass::Linear],
        },
        TaskResults {
            correctness_outputs: vec![Value::text("Total: 4")],
            ..TaskResults::default()
        },
    ]
}

/// Results for the fixture question where the first element is skipped.
fn skips_first(code: &str) -> Submission {
    let mut results = passing_results();
    results[0].buggy_outputs = vec![true];
    results[0].correctness_outputs = vec![Value::Int(5), Value::Int(0)];
    Submission::new(CodeEvalResult::new(code, results))
}

fn drill(task: &Task, _: &CodeEvalResult) -> Option<Reinforcement> {
    task.name
        .as_ref()
        .map(|name| Reinforcement::new(serde_json::json!({ "drill": name })))
}

#[test]
fn test_fixtures_load() {
    let question = load_question();
    assert_eq!(question.tasks.len(), 2);
    assert_eq!(
        question.tasks[1].output_function.as_deref(),
        Some("describe")
    );

    let config = load_config();
    assert_eq!(config.time_limit_secs, 2);
    assert_eq!(config.supported_libraries_list(), "math, itertools");
}

#[test]
fn test_hint_escalation_over_three_turns() {
    let question = load_question();
    let engine = FeedbackEngine::new(load_config());
    let hints = &question.tasks[0].buggy_output_tests[0].hints;

    let first = skips_first("for i in range(1, len(xs)): t += xs[i]");
    let feedback = engine.evaluate(&question.tasks, &first, None).unwrap();
    assert_eq!(feedback.hint_index, Some(0));
    assert_eq!(feedback.paragraphs[0].text, hints[0]);
    let previous = Snapshot::new(first.result, feedback);

    let second = skips_first("for i in range(1, len(xs) + 1): t += xs[i - 1] if i > 1 else 0");
    let feedback = engine
        .evaluate(&question.tasks, &second, Some(&previous))
        .unwrap();
    assert_eq!(feedback.hint_index, Some(1));
    assert_eq!(feedback.paragraphs[0].text, hints[1]);
    let previous = Snapshot::new(second.result, feedback);

    let third = skips_first("t = sum(xs[1:])");
    let feedback = engine
        .evaluate(&question.tasks, &third, Some(&previous))
        .unwrap();
    assert_eq!(feedback.hint_index, Some(1));
    assert_eq!(feedback.paragraphs[0].text, hints[1]);
}

#[test]
fn test_identical_resubmission_is_idempotent() {
    let question = load_question();
    let engine = FeedbackEngine::default();

    let first = skips_first("S1");
    let feedback = engine.evaluate(&question.tasks, &first, None).unwrap();
    let previous = Snapshot::new(first.result.clone(), feedback.clone());

    let again = engine
        .evaluate(&question.tasks, &first, Some(&previous))
        .unwrap();
    assert_eq!(again.hint_index, feedback.hint_index);
    assert_eq!(again.paragraphs, feedback.paragraphs);
}

#[test]
fn test_buggy_pattern_outranks_later_failures() {
    let question = load_question();
    let engine = FeedbackEngine::default();

    let mut submission = skips_first("S1");
    submission.result.task_results[0].performance_classes = vec![ComplexityClass::Quadratic];
    submission.result.task_results[1].correctness_outputs = vec![Value::text("4")];

    let feedback = engine.evaluate(&question.tasks, &submission, None).unwrap();
    assert_eq!(
        feedback.case,
        FeedbackCase::BuggyOutput {
            task_index: 0,
            test_index: 0
        }
    );
}

#[test]
fn test_second_task_correctness_names_output_function() {
    let question = load_question();
    let engine = FeedbackEngine::default();

    let mut results = passing_results();
    results[1].correctness_outputs = vec![Value::text("4")];
    let submission = Submission::new(CodeEvalResult::new("S", results));

    let feedback = engine.evaluate(&question.tasks, &submission, None).unwrap();
    assert_eq!(
        feedback.case,
        FeedbackCase::Correctness {
            task_index: 1,
            test_index: 0
        }
    );
    assert!(feedback.paragraphs[0].text.contains("describe()"));
    assert!(feedback.paragraphs[0].text.contains(r#""4""#));
    assert!(feedback.paragraphs[1].text.contains(r#""total: 4""#));
    assert!(!feedback.paragraphs[1].text.contains("Total: 4"));
}

#[test]
fn test_completion_with_reinforcement() {
    let question = load_question();
    let engine = FeedbackEngine::default().with_reinforcement(drill);

    let submission = Submission::new(CodeEvalResult::new("S", passing_results()));
    let feedback = engine.evaluate(&question.tasks, &submission, None).unwrap();

    assert!(feedback.completed);
    assert!(feedback.paragraphs[0].text.contains("Click Next"));
    assert_eq!(
        feedback.reinforcement,
        Some(Reinforcement::new(
            serde_json::json!({ "drill": "describe_total" })
        ))
    );
}

#[test]
fn test_timeout_uses_configured_limit() {
    let question = load_question();
    let engine = FeedbackEngine::new(load_config()).with_reinforcement(drill);

    let mut result = CodeEvalResult::new("while True: pass", passing_results());
    result.error = Some("TimeoutError: execution exceeded the limit".to_string());

    let feedback = engine
        .evaluate(&question.tasks, &Submission::new(result), None)
        .unwrap();
    assert_eq!(feedback.case, FeedbackCase::Timeout);
    assert_eq!(feedback.paragraphs.len(), 1);
    assert!(feedback.paragraphs[0].text.contains("2 seconds"));
    assert!(feedback.reinforcement.is_none());
}

#[test]
fn test_runtime_error_in_harness_line() {
    let question = load_question();
    let engine = FeedbackEngine::default();

    let mut lines: Vec<Option<usize>> = (1..=6).map(Some).collect();
    lines.push(None);
    let submission = Submission::new(CodeEvalResult::failed(
        "1\n2\n3\n4\n5\n6\nassert total([]) == 0",
        "AssertionError: unexpected result on line 7",
    ))
    .with_line_map(SourceLineMap::new(lines));

    let feedback = engine.evaluate(&question.tasks, &submission, None).unwrap();
    assert_eq!(feedback.case, FeedbackCase::RuntimeError);
    assert_eq!(
        feedback.paragraphs[1].text,
        format!("AssertionError: unexpected result on {HARNESS_LINE_TEXT}")
    );
}

#[test]
fn test_misaligned_results_abort() {
    let question = load_question();
    let engine = FeedbackEngine::default();

    let mut results = passing_results();
    results[0].correctness_outputs.pop();
    let submission = Submission::new(CodeEvalResult::new("S", results));

    let err = engine
        .evaluate(&question.tasks, &submission, None)
        .unwrap_err();
    assert!(err.is_contract_violation());
}
