/// Shared data types: `Record` and `GroupKey`.
///
/// A `Record` is a flat JSON object. Grouping never mutates one; records are
/// moved through the grouping tree and handed back unchanged by `flatten`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{json_type_name, GroupError};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One flat record: field name to scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Record(fields)
    }

    /// Converts one element of an input array. `index` is only used for the
    /// error message.
    pub fn from_value(index: usize, value: Value) -> Result<Self, GroupError> {
        match value {
            Value::Object(fields) => Ok(Record(fields)),
            other => Err(GroupError::InvalidRecord {
                index,
                found: json_type_name(&other),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Grouping key for `field`. Absent fields map to `GroupKey::Missing`.
    pub fn key_for(&self, field: &str) -> Result<GroupKey, GroupError> {
        match self.0.get(field) {
            None => Ok(GroupKey::Missing),
            Some(value) => GroupKey::from_value(field, value),
        }
    }
}

// ---------------------------------------------------------------------------
// GroupKey
// ---------------------------------------------------------------------------

/// Value of one grouping field, used as the bucket key at one level.
///
/// Equality is typed: the number `2` and the string `"2"` are different
/// buckets. Integral floats are normalized, so `1` and `1.0` share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// The record has no such field.
    Missing,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl GroupKey {
    pub fn from_value(field: &str, value: &Value) -> Result<Self, GroupError> {
        match value {
            Value::Null => Ok(GroupKey::Null),
            Value::Bool(b) => Ok(GroupKey::Bool(*b)),
            Value::Number(n) => Ok(GroupKey::Number(normalize_number(n))),
            Value::String(s) => Ok(GroupKey::String(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(GroupError::NonScalarField {
                field: field.to_string(),
                found: json_type_name(value),
            }),
        }
    }

    /// The key as a JSON value; `None` for `Missing`.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            GroupKey::Missing => None,
            GroupKey::Null => Some(Value::Null),
            GroupKey::Bool(b) => Some(Value::Bool(*b)),
            GroupKey::Number(n) => Some(Value::Number(n.clone())),
            GroupKey::String(s) => Some(Value::String(s.clone())),
        }
    }

    /// Numeric reading of the key: numbers, and strings that parse as a
    /// finite number.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            GroupKey::Number(n) => n.as_f64(),
            GroupKey::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            GroupKey::Missing => 0,
            GroupKey::Null => 1,
            GroupKey::Bool(_) => 2,
            GroupKey::Number(_) => 3,
            GroupKey::String(_) => 4,
        }
    }

    /// Ordering used by `KeyOrder::Ascending`.
    ///
    /// Keys with a numeric reading sort before the rest and compare by
    /// value. Everything else compares by type rank, then naturally.
    /// Not consistent with `Eq` (`2` and `"2"` compare equal here).
    pub fn ascending_cmp(&self, other: &GroupKey) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (GroupKey::Bool(a), GroupKey::Bool(b)) => a.cmp(b),
                (GroupKey::String(a), GroupKey::String(b)) => a.cmp(b),
                _ => self.type_rank().cmp(&other.type_rank()),
            },
        }
    }
}

/// Rewrites floats with no fractional part as integers.
fn normalize_number(n: &Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                return Number::from(f as i64);
            }
        }
    }
    n.clone()
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Missing => write!(f, "<missing>"),
            GroupKey::Null => write!(f, "null"),
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Number(n) => write!(f, "{}", n),
            GroupKey::String(s) => write!(f, "{}", s),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
