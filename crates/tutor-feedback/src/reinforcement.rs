//! Follow-up exercise suggestions.
//!
//! Suggestions come from an external generator and are opaque to the
//! engine. They are only requested for submissions that ran without an
//! execution error.

use serde::{Deserialize, Serialize};

use crate::eval::CodeEvalResult;
use crate::task::Task;

/// An opaque follow-up suggestion produced by a [`ReinforcementSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reinforcement(pub serde_json::Value);

impl Reinforcement {
    /// Wraps an arbitrary JSON payload.
    #[must_use]
    pub const fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }
}

/// Produces follow-up suggestions for a task.
pub trait ReinforcementSource: Send + Sync {
    /// Returns a suggestion for `task` given the latest evaluation, if the
    /// generator has one.
    fn reinforcement(&self, task: &Task, result: &CodeEvalResult) -> Option<Reinforcement>;
}

/// A source that never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReinforcement;

impl ReinforcementSource for NoReinforcement {
    fn reinforcement(&self, _task: &Task, _result: &CodeEvalResult) -> Option<Reinforcement> {
        None
    }
}

impl<F> ReinforcementSource for F
where
    F: Fn(&Task, &CodeEvalResult) -> Option<Reinforcement> + Send + Sync,
{
    fn reinforcement(&self, task: &Task, result: &CodeEvalResult) -> Option<Reinforcement> {
        self(task, result)
    }
}
