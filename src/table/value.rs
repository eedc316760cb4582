//! Cell values of a [DataTable](crate::table::DataTable).

use serde::Serialize;
use std::fmt;

/// Token written for missing values.
pub const MISSING_TOKEN: &str = "NA";

/// A single cell of a data table.
///
/// Numeric columns hold [Value::Number]; categorical and free-text columns
/// hold [Value::Text]. Empty cells and `NA`s are [Value::Missing].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Returns `true` for [Value::Missing].
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Returns the number, if this is a [Value::Number].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is a [Value::Text].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as a taxon name: text as is, numbers in their
    /// shortest form (`12.0` becomes `"12"`), and `None` for missing values.
    ///
    /// ```
    /// use phylomatch::table::Value;
    ///
    /// assert_eq!(Value::Text("Weka".into()).as_name().as_deref(), Some("Weka"));
    /// assert_eq!(Value::Number(12.0).as_name().as_deref(), Some("12"));
    /// assert_eq!(Value::Missing.as_name(), None);
    /// ```
    pub fn as_name(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            value => Some(value.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(MISSING_TOKEN),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        if n.is_nan() { Value::Missing } else { Value::Number(n) }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
