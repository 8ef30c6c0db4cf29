//! The top-level entry point callers hold on to.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compose;
use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::eval::CodeEvalResult;
use crate::feedback::Feedback;
use crate::history::Snapshot;
use crate::interpreter::select_feedback_case;
use crate::prereq::PrereqCheckFailure;
use crate::reinforcement::{NoReinforcement, ReinforcementSource};
use crate::task::Task;
use crate::trace::SourceLineMap;

/// One evaluated submission as handed over by the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The sandbox's evaluation result.
    pub result: CodeEvalResult,

    /// Line map for `result.preprocessed_code`. An absent map means the
    /// code was executed without harness lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_map: Option<SourceLineMap>,
}

impl Submission {
    /// Creates a submission whose executed lines are the student's lines.
    #[must_use]
    pub const fn new(result: CodeEvalResult) -> Self {
        Self {
            result,
            line_map: None,
        }
    }

    /// Attaches an explicit line map.
    #[must_use]
    pub fn with_line_map(mut self, line_map: SourceLineMap) -> Self {
        self.line_map = Some(line_map);
        self
    }

    /// Returns the line map, defaulting to the identity over the executed code.
    #[must_use]
    pub fn resolved_line_map(&self) -> SourceLineMap {
        self.line_map
            .clone()
            .unwrap_or_else(|| SourceLineMap::for_code(&self.result.preprocessed_code))
    }
}

/// Produces feedback for submissions.
///
/// Holds only read-only configuration, so a single engine can serve any
/// number of sessions concurrently.
#[derive(Clone)]
pub struct FeedbackEngine {
    config: FeedbackConfig,
    reinforcement: Arc<dyn ReinforcementSource>,
}

impl fmt::Debug for FeedbackEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for FeedbackEngine {
    fn default() -> Self {
        Self::new(FeedbackConfig::default())
    }
}

impl FeedbackEngine {
    /// Creates an engine without a reinforcement source.
    #[must_use]
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            reinforcement: Arc::new(NoReinforcement),
        }
    }

    /// Replaces the reinforcement source.
    #[must_use]
    pub fn with_reinforcement(mut self, source: impl ReinforcementSource + 'static) -> Self {
        self.reinforcement = Arc::new(source);
        self
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Produces the feedback for one submission.
    ///
    /// A reinforcement is requested, keyed on the last task, only when the
    /// submission ran without an execution error and `tasks` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if the result does not line up with
    /// `tasks` or a runtime error cannot be mapped to a student line.
    pub fn evaluate(
        &self,
        tasks: &[Task],
        submission: &Submission,
        previous: Option<&Snapshot>,
    ) -> Result<Feedback> {
        let result = &submission.result;
        let line_map = submission.resolved_line_map();

        let mut feedback =
            select_feedback_case(tasks, result, &line_map, previous, &self.config)?;

        if !feedback.case.is_execution_error() {
            if let Some(task) = tasks.last() {
                feedback.reinforcement = self.reinforcement.reinforcement(task, result);
                debug!(
                    attached = feedback.reinforcement.is_some(),
                    "Requested reinforcement"
                );
            }
        }

        info!(
            case = ?feedback.case,
            completed = feedback.completed,
            hint_index = ?feedback.hint_index,
            "Feedback generated"
        );
        Ok(feedback)
    }

    /// Wraps syntax error output into feedback.
    #[must_use]
    pub fn syntax_error(&self, text: impl Into<String>) -> Feedback {
        compose::syntax_error(text)
    }

    /// Renders a prerequisite-check failure.
    #[must_use]
    pub fn prerequisite_failure(&self, failure: &PrereqCheckFailure, starter_code: &str) -> Feedback {
        debug!(failure = ?failure, "Prerequisite check failed");
        compose::prerequisite_failure(failure, starter_code, &self.config)
    }
}
