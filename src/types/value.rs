use std::cmp::Ordering;
use std::fmt;

use super::node::CompareOp;

/// Scalar values used both as comparison literals and as record values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit floating-point number. Integers are stored here too.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Compare this value to another using the given operator.
    ///
    /// Returns `None` for incompatible type pairings and for ordering
    /// operators applied to booleans.
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Some(match op {
                CompareOp::Eq => a == b,
                CompareOp::Neq => a != b,
                CompareOp::Gt => a > b,
                CompareOp::Gte => a >= b,
                CompareOp::Lt => a < b,
                CompareOp::Lte => a <= b,
            }),
            (Value::String(a), Value::String(b)) => Some(ordering_matches(op, a.cmp(b))),
            (Value::Bool(a), Value::Bool(b)) => match op {
                CompareOp::Eq => Some(a == b),
                CompareOp::Neq => Some(a != b),
                _ => None,
            },
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
        }
    }
}

fn ordering_matches(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Neq => ord != Ordering::Equal,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Gte => ord != Ordering::Less,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Lte => ord != Ordering::Greater,
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Renders the value as a rule-text literal: strings are single-quoted with
/// `'` and `\` escaped, so the output can be parsed back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => {
                f.write_str("'")?;
                for c in v.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
        }
    }
}
