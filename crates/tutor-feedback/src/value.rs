//! Display values for test inputs and outputs.
//!
//! The sandbox reports inputs and outputs as JSON. They are converted once,
//! at the boundary, into the closed [`Value`] type so that rendering can
//! never meet a kind it does not know how to print.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A structured value that can appear as a test input or output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// The absent value.
    None,
    /// A text string.
    Text(String),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A mapping of key/value entries. Equality ignores entry order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Creates a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Renders the value in the tutor's display notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutor_feedback::Value;
    ///
    /// let value = Value::List(vec![Value::Int(1), Value::text("a\tb"), Value::None]);
    /// assert_eq!(value.to_display_string(), r#"[1, "a\tb", None]"#);
    /// ```
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => same_entries(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Text(s) => write_quoted(f, s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write_float(f, *x),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Compares entry lists as multisets, so repeated entries must repeat equally often.
fn same_entries(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    let count = |entries: &[(Value, Value)], entry: &(Value, Value)| {
        entries.iter().filter(|other| *other == entry).count()
    };
    a.len() == b.len() && a.iter().all(|entry| count(a, entry) == count(b, entry))
}

/// Writes a double-quoted string with tabs and newlines made visible.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

/// Integral floats keep a trailing `.0` so they read differently from integers.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("nan")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "inf" } else { "-inf" })
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (Self::Text(key), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::None => Self::Null,
            Value::Text(s) => Self::String(s),
            Value::Int(n) => Self::from(n),
            // Non-finite floats have no JSON form.
            Value::Float(x) => serde_json::Number::from_f64(x).map_or(Self::Null, Self::Number),
            Value::Bool(b) => Self::Bool(b),
            Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Map(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| {
                        let key = match key {
                            Value::Text(s) => s,
                            other => other.to_display_string(),
                        };
                        (key, Self::from(value))
                    })
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}
