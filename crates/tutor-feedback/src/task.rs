//! Tasks and the three kinds of tests they own.
//!
//! Tasks come from static question content and are never mutated during a
//! session. Each task is checked in a fixed order: buggy-output tests first,
//! then correctness tests, then performance tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One gradable unit of an exercise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Optional human-readable name, used in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tests that detect known-incorrect implementations.
    #[serde(default)]
    pub buggy_output_tests: Vec<BuggyOutputTest>,

    /// Input/allowed-output pairs.
    #[serde(default)]
    pub correctness_tests: Vec<CorrectnessTest>,

    /// Expected asymptotic behaviour.
    #[serde(default)]
    pub performance_tests: Vec<PerformanceTest>,

    /// Name of the function the student's result is passed through before
    /// comparison, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_function: Option<String>,
}

impl Task {
    /// Returns the task name, or a positional label when it has none.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("task {}", index + 1))
    }
}

/// One input and the set of outputs accepted for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectnessTest {
    /// The input passed to the student's code.
    pub input: Value,

    /// Outputs accepted as correct. Any match counts as a pass.
    pub allowed_outputs: Vec<Value>,
}

impl CorrectnessTest {
    /// Creates a test with a single allowed output.
    #[must_use]
    pub fn new(input: impl Into<Value>, output: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            allowed_outputs: vec![output.into()],
        }
    }

    /// Returns `true` if `output` is one of the allowed outputs.
    #[must_use]
    pub fn matches(&self, output: &Value) -> bool {
        self.allowed_outputs.iter().any(|allowed| allowed == output)
    }

    /// Returns the allowed output shown to the student as an example.
    #[must_use]
    pub fn representative_output(&self) -> Option<&Value> {
        self.allowed_outputs.first()
    }
}

/// Detects a specific, known-incorrect implementation pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuggyOutputTest {
    /// Stable identifier of the bug this test detects.
    pub id: String,

    /// Name of the buggy reference implementation the submission is compared with.
    pub reference: String,

    /// Hints in escalation order. Never empty in validated content.
    pub hints: Vec<String>,
}

impl BuggyOutputTest {
    /// Creates a new buggy-output test.
    #[must_use]
    pub fn new(id: impl Into<String>, reference: impl Into<String>, hints: Vec<String>) -> Self {
        Self {
            id: id.into(),
            reference: reference.into(),
            hints,
        }
    }

    /// Index of the final hint.
    #[must_use]
    pub fn last_hint_index(&self) -> usize {
        self.hints.len().saturating_sub(1)
    }

    /// Returns the hint at `index`, repeating the last hint past the end.
    #[must_use]
    pub fn hint(&self, index: usize) -> &str {
        self.hints
            .get(index.min(self.last_hint_index()))
            .map_or("", String::as_str)
    }
}

/// Checks the submission's asymptotic behaviour class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTest {
    /// Class the submission is expected to achieve.
    pub expected: ComplexityClass,
}

impl PerformanceTest {
    /// Returns `true` if the observed class is the expected one.
    #[must_use]
    pub fn matches(&self, observed: ComplexityClass) -> bool {
        self.expected == observed
    }
}

/// Asymptotic performance classes reported by the sandbox's profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexityClass {
    /// O(1).
    Constant,
    /// O(log n).
    Logarithmic,
    /// O(n).
    Linear,
    /// O(n log n).
    Linearithmic,
    /// O(n^2).
    Quadratic,
    /// O(n^3).
    Cubic,
    /// O(2^n).
    Exponential,
    /// O(n!).
    Factorial,
}

impl ComplexityClass {
    /// Big-O label shown to students.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::Linear => "O(n)",
            Self::Linearithmic => "O(n log n)",
            Self::Quadratic => "O(n^2)",
            Self::Cubic => "O(n^3)",
            Self::Exponential => "O(2^n)",
            Self::Factorial => "O(n!)",
        }
    }

    /// Parses either a class name (`"linear"`) or a Big-O label (`"O(n)"`),
    /// ignoring case and whitespace.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "constant" | "o(1)" => Some(Self::Constant),
            "logarithmic" | "o(logn)" => Some(Self::Logarithmic),
            "linear" | "o(n)" => Some(Self::Linear),
            "linearithmic" | "o(nlogn)" => Some(Self::Linearithmic),
            "quadratic" | "o(n^2)" | "o(n**2)" => Some(Self::Quadratic),
            "cubic" | "o(n^3)" | "o(n**3)" => Some(Self::Cubic),
            "exponential" | "o(2^n)" | "o(2**n)" => Some(Self::Exponential),
            "factorial" | "o(n!)" => Some(Self::Factorial),
            _ => None,
        }
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ComplexityClass {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid complexity class '{s}': expected a name such as 'linear' or a label such as 'O(n log n)'"
            ))
        })
    }
}

impl Serialize for ComplexityClass {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// The three test sequences a task owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Buggy-output tests.
    BuggyOutput,
    /// Correctness tests.
    Correctness,
    /// Performance tests.
    Performance,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuggyOutput => write!(f, "buggy-output"),
            Self::Correctness => write!(f, "correctness"),
            Self::Performance => write!(f, "performance"),
        }
    }
}
