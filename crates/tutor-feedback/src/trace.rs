//! Mapping evaluator line numbers back to the student's source.
//!
//! The sandbox runs the student's code wrapped in harness code, so the line
//! numbers it reports refer to the preprocessed program. A [`SourceLineMap`]
//! records, for every executed line, the original student line or the fact
//! that the line belongs to the harness.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

/// Text substituted for a line reference that points into harness code.
pub const HARNESS_LINE_TEXT: &str = "a line in the test code";

/// Trailing `line <N>` marker of an error trace.
static TRAILING_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\bline (\d+)(\s*)$").ok());

/// Maps executed line positions to original student lines.
///
/// Position `i` describes executed line `i + 1`; `None` marks harness code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLineMap(Vec<Option<usize>>);

impl SourceLineMap {
    /// Creates a map from per-line entries.
    #[must_use]
    pub const fn new(lines: Vec<Option<usize>>) -> Self {
        Self(lines)
    }

    /// Creates a map in which executed line `n` is student line `n`.
    #[must_use]
    pub fn identity(line_count: usize) -> Self {
        Self((1..=line_count).map(Some).collect())
    }

    /// Creates an identity map covering every line of `code`.
    #[must_use]
    pub fn for_code(code: &str) -> Self {
        Self::identity(code.lines().count())
    }

    /// Number of executed lines covered by the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map covers no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a 1-based executed line number.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::LineOutOfRange` if the line is 0 or past the
    /// end of the map.
    pub fn resolve(&self, executed_line: usize) -> Result<SourceLine> {
        let entry = executed_line
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .ok_or_else(|| FeedbackError::line_out_of_range(executed_line, self.len()))?;

        Ok(entry.map_or(SourceLine::Harness, SourceLine::Student))
    }
}

/// Where an executed line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLine {
    /// A line of the student's own code, 1-based.
    Student(usize),
    /// A line of harness code added around the submission.
    Harness,
}

/// The trailing location marker of an error trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLocation {
    /// The 1-based executed line number.
    pub line: usize,
    /// Byte offset where the marker starts.
    start: usize,
    /// Byte offset just past the line number.
    end: usize,
}

impl TraceLocation {
    /// Parses the trailing `line <N>` marker of `trace`, if present.
    #[must_use]
    pub fn parse(trace: &str) -> Option<Self> {
        let captures = TRAILING_LINE.as_ref()?.captures(trace)?;
        let marker = captures.get(0)?;
        let number = captures.get(1)?;
        let line = number.as_str().parse().ok()?;

        Some(Self {
            line,
            start: marker.start(),
            end: number.end(),
        })
    }
}

/// Rewrites the trailing line reference of `trace` in student terms.
///
/// A trace without a trailing `line <N>` marker is returned unchanged.
///
/// # Errors
///
/// Returns `FeedbackError::LineOutOfRange` if the marker names a line the map
/// cannot resolve.
///
/// # Examples
///
/// ```
/// use tutor_feedback::{remap_trace, SourceLineMap};
///
/// let map = SourceLineMap::new(vec![None, Some(1), Some(2)]);
/// let trace = remap_trace("IndexError: list index out of range on line 3", &map).unwrap();
/// assert_eq!(trace, "IndexError: list index out of range on line 2");
/// ```
pub fn remap_trace(trace: &str, map: &SourceLineMap) -> Result<String> {
    let Some(location) = TraceLocation::parse(trace) else {
        return Ok(trace.to_string());
    };

    let replacement = match map.resolve(location.line)? {
        SourceLine::Student(line) => format!("line {line}"),
        SourceLine::Harness => HARNESS_LINE_TEXT.to_string(),
    };

    Ok(format!(
        "{}{}{}",
        &trace[..location.start],
        replacement,
        &trace[location.end..]
    ))
}
