//! Configuration for feedback generation.
//!
//! The values here are the only environment-specific inputs of the engine:
//! the sandbox time limit quoted in timeout feedback, the library allowlist
//! quoted in prerequisite feedback, and the size limit for question files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "tutor.json";

/// Default execution time limit in seconds.
const fn default_time_limit_secs() -> u32 {
    5
}

/// Default allowlist of importable libraries.
fn default_supported_libraries() -> Vec<String> {
    ["math", "random", "re", "string", "collections", "itertools", "functools"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Default maximum question file size in kilobytes.
const fn default_max_question_size_kb() -> u64 {
    256
}

/// Feedback engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackConfig {
    /// Execution time limit enforced by the sandbox, in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,

    /// Libraries students may import, listed verbatim in feedback.
    #[serde(default = "default_supported_libraries")]
    pub supported_libraries: Vec<String>,

    /// Largest question file accepted by [`crate::Question::load`].
    #[serde(default = "default_max_question_size_kb")]
    pub max_question_size_kb: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            supported_libraries: default_supported_libraries(),
            max_question_size_kb: default_max_question_size_kb(),
        }
    }
}

impl FeedbackConfig {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `tutor.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            FeedbackError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `tutor.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::ConfigParseError` if the file cannot be read
    /// or is not valid JSON, and `FeedbackError::ConfigValidationError` if a
    /// value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(FeedbackError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| FeedbackError::config_parse(path, e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::ConfigValidationError` if the time limit or
    /// size limit is zero, or if a library name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.time_limit_secs == 0 {
            return Err(FeedbackError::config_validation(
                "timeLimitSecs must be greater than 0",
                "Set timeLimitSecs to the sandbox's time limit in your tutor.json",
            ));
        }

        if self.max_question_size_kb == 0 {
            return Err(FeedbackError::config_validation(
                "maxQuestionSizeKb must be greater than 0",
                "Set maxQuestionSizeKb to at least 1 in your tutor.json",
            ));
        }

        if self.supported_libraries.iter().any(|lib| lib.trim().is_empty()) {
            return Err(FeedbackError::config_validation(
                "supportedLibraries must not contain blank names",
                "Remove empty entries from supportedLibraries in your tutor.json",
            ));
        }

        Ok(())
    }

    /// Returns the allowlist as a comma-separated list.
    #[must_use]
    pub fn supported_libraries_list(&self) -> String {
        self.supported_libraries.join(", ")
    }
}
