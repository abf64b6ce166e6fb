//! Typed field values
//!
//! Values are read out of records by registered accessors and compared
//! without reflection. `List` is the only kind without a total order.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    List,
}

impl FieldKind {
    /// Returns true if values of this kind have a total order
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::List)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::Timestamp => "timestamp",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed value read from a record.
///
/// JSON form is untagged. Timestamps serialize as RFC 3339 strings and come
/// back as `Text`; [`FieldValue::coerce`] turns them into timestamps again
/// once the target field kind is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Kind of the value, `None` for null
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(_) => Some(FieldKind::Bool),
            FieldValue::Int(_) => Some(FieldKind::Int),
            FieldValue::Float(_) => Some(FieldKind::Float),
            FieldValue::Text(_) => Some(FieldKind::Text),
            FieldValue::Timestamp(_) => Some(FieldKind::Timestamp),
            FieldValue::List(_) => Some(FieldKind::List),
        }
    }

    /// Converts the value into the representation used by `kind`.
    ///
    /// Null passes through. Ints and floats are interchangeable. Text is
    /// parsed into bools, numbers and timestamps (RFC 3339 or `YYYY-MM-DD`),
    /// and scalars render to text for text fields. Returns `None` when no
    /// conversion exists.
    pub fn coerce(self, kind: FieldKind) -> Option<FieldValue> {
        match (self, kind) {
            (FieldValue::Null, _) => Some(FieldValue::Null),

            (v @ FieldValue::Bool(_), FieldKind::Bool) => Some(v),
            (v @ (FieldValue::Int(_) | FieldValue::Float(_)), FieldKind::Int | FieldKind::Float) => {
                Some(v)
            }
            (v @ FieldValue::Text(_), FieldKind::Text) => Some(v),
            (v @ FieldValue::Timestamp(_), FieldKind::Timestamp) => Some(v),
            (v @ FieldValue::List(_), FieldKind::List) => Some(v),

            (FieldValue::Text(s), FieldKind::Bool) => match s.trim() {
                "true" => Some(FieldValue::Bool(true)),
                "false" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            (FieldValue::Text(s), FieldKind::Int) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(FieldValue::Int)
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(FieldValue::Float))
            }
            (FieldValue::Text(s), FieldKind::Float) => {
                s.trim().parse::<f64>().ok().map(FieldValue::Float)
            }
            (FieldValue::Text(s), FieldKind::Timestamp) => {
                parse_timestamp(s.trim()).map(FieldValue::Timestamp)
            }

            (v @ (FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Float(_)), FieldKind::Text) => {
                Some(FieldValue::Text(v.to_string()))
            }
            (FieldValue::Timestamp(ts), FieldKind::Text) => Some(FieldValue::Text(ts.to_rfc3339())),

            _ => None,
        }
    }

    /// Total order used for sorting and range tests.
    ///
    /// Null sorts before everything. Ints and floats compare numerically,
    /// floats by IEEE total order. Values of unrelated kinds order by kind.
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (List(a), List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Equality as the Equals operator sees it
    pub fn matches_eq(&self, other: &FieldValue, ignore_case: bool) -> bool {
        use FieldValue::*;

        match (self, other) {
            (Text(a), Text(b)) if ignore_case => a.to_lowercase() == b.to_lowercase(),
            (Int(_) | Float(_), Int(_) | Float(_)) => self.total_cmp(other) == Ordering::Equal,
            (List(a), List(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.matches_eq(y, ignore_case))
            }
            (a, b) => a == b,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Timestamp(_) => 4,
            FieldValue::List(_) => 5,
        }
    }

    /// Builds a value from JSON, honouring the declared kind.
    ///
    /// A JSON value that cannot be represented as `kind` reads as null.
    pub fn from_json(value: &serde_json::Value, kind: FieldKind) -> FieldValue {
        Self::from_json_untyped(value)
            .coerce(kind)
            .unwrap_or(FieldValue::Null)
    }

    fn from_json_untyped(value: &serde_json::Value) -> FieldValue {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => {
                FieldValue::List(items.iter().map(Self::from_json_untyped).collect())
            }
            Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Stringified form used by the Contains operator and free-text search
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl<V: Into<FieldValue>> From<Vec<V>> for FieldValue {
    fn from(v: Vec<V>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}
