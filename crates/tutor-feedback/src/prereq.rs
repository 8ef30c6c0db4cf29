//! Structural problems detected before a submission is executed.

use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

/// A prerequisite-check failure reported by the static checker.
///
/// The variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrereqCheckFailure {
    /// A function from the starter code is missing or was renamed.
    MissingStarterCode,
    /// The submission imports libraries outside the allowlist.
    DisallowedImports {
        /// The offending import names, in source order.
        imports: Vec<String>,
    },
    /// The submission has statements outside the required function.
    CodeOutsideFunction,
}

impl PrereqCheckFailure {
    /// Builds a failure from the static checker's independent flags.
    ///
    /// `disallowed_imports` counts as an indication when non-empty.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::NoPrerequisiteFailure` if no flag is set and
    /// `FeedbackError::ConflictingPrerequisiteFailures` if more than one is.
    pub fn from_flags(
        missing_starter_code: bool,
        disallowed_imports: Vec<String>,
        code_outside_function: bool,
    ) -> Result<Self> {
        let count = usize::from(missing_starter_code)
            + usize::from(!disallowed_imports.is_empty())
            + usize::from(code_outside_function);

        match count {
            0 => Err(FeedbackError::NoPrerequisiteFailure),
            1 if missing_starter_code => Ok(Self::MissingStarterCode),
            1 if code_outside_function => Ok(Self::CodeOutsideFunction),
            1 => Ok(Self::DisallowedImports {
                imports: disallowed_imports,
            }),
            count => Err(FeedbackError::ConflictingPrerequisiteFailures { count }),
        }
    }
}
