//! Question content: the starter code and ordered tasks of one exercise.
//!
//! Questions are static JSON documents. They are loaded once, validated,
//! and never mutated while a session is running.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};
use crate::task::Task;

/// One exercise as authored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable question identifier.
    pub id: String,

    /// Title shown to students.
    #[serde(default)]
    pub title: String,

    /// Starter template the student edits.
    #[serde(default)]
    pub starter_code: String,

    /// Tasks in evaluation order.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Question {
    /// Loads and validates a question file.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::QuestionNotFound` if the file doesn't exist,
    /// `FeedbackError::QuestionTooLarge` if it exceeds `max_size_kb`,
    /// `FeedbackError::QuestionEncodingError` if it is not valid UTF-8,
    /// `FeedbackError::Json` if it is not a question document, and
    /// `FeedbackError::InvalidQuestion` if it breaks a content invariant.
    pub fn load(path: impl AsRef<Path>, max_size_kb: u64) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FeedbackError::question_not_found(path)
            } else {
                FeedbackError::Io(e)
            }
        })?;

        let file_size = metadata.len();
        if file_size > max_size_kb.saturating_mul(1024) {
            return Err(FeedbackError::question_too_large(
                path,
                file_size / 1024,
                max_size_kb,
            ));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                FeedbackError::question_encoding(path)
            } else {
                FeedbackError::Io(e)
            }
        })?;

        let question: Self = serde_json::from_str(&content)?;
        question.validate()?;

        tracing::debug!(
            id = %question.id,
            tasks = question.tasks.len(),
            "Loaded question"
        );
        Ok(question)
    }

    /// Checks the content invariants the interpreter relies on.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidQuestion` if the id is blank, a buggy
    /// test has no hints or a blank or duplicate id, or a correctness test
    /// has no allowed output.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FeedbackError::invalid_question(
                "question id must not be empty",
                "Give the question a stable \"id\"",
            ));
        }

        let mut bug_ids = HashSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            let label = task.label(index);

            for test in &task.buggy_output_tests {
                if test.id.trim().is_empty() {
                    return Err(FeedbackError::invalid_question(
                        format!("{label}: buggy-output test for '{}' has no id", test.reference),
                        "Give every buggy-output test a unique \"id\"",
                    ));
                }
                if test.hints.is_empty() {
                    return Err(FeedbackError::invalid_question(
                        format!("{label}: buggy-output test '{}' has no hints", test.id),
                        "Add at least one entry to \"hints\"",
                    ));
                }
                if !bug_ids.insert(test.id.as_str()) {
                    return Err(FeedbackError::invalid_question(
                        format!("{label}: buggy-output test id '{}' is used twice", test.id),
                        "Buggy-output test ids must be unique within a question",
                    ));
                }
            }

            if let Some(position) = task
                .correctness_tests
                .iter()
                .position(|test| test.allowed_outputs.is_empty())
            {
                return Err(FeedbackError::invalid_question(
                    format!("{label}: correctness test {} has no allowed outputs", position + 1),
                    "Add at least one entry to \"allowedOutputs\"",
                ));
            }
        }

        Ok(())
    }
}
