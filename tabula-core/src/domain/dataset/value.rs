// tabula-core/src/domain/dataset/value.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a column. Integer and Float together form the "numeric"
/// family that scaling, fills and feature operations accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Text,
    Timestamp,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cell. `Null` is the explicit missing marker: there is no NaN
/// smuggling, a missing numeric cell is `Null`, never `Float(NAN)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view (Int and Float only). Null and non-numeric give None.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Hashable, totally-ordered stand-in used for deduplication, grouping
    /// and category enumeration (f64 is neither Eq nor Hash).
    pub fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            Self::Int(i) => ValueKey::Int(*i),
            Self::Bool(b) => ValueKey::Bool(*b),
            Self::Float(f) => ValueKey::Float(float_total_bits(*f)),
            Self::Timestamp(ts) => {
                let utc = ts.and_utc();
                ValueKey::Timestamp(utc.timestamp(), utc.timestamp_subsec_nanos())
            }
            Self::Text(s) => ValueKey::Text(s.clone()),
        }
    }

    /// Plain-text rendering for CSV output and derived column names.
    /// Null renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Float(f) => format!("{}", f),
            Self::Timestamp(ts) => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Total-order key derived from a `Value`. Float ordering uses the
/// sign-folded bit trick so that the derived `Ord` matches numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    Int(i64),
    Bool(bool),
    Float(u64),
    Timestamp(i64, u32),
    Text(String),
}

fn float_total_bits(v: f64) -> u64 {
    let bits = v.to_bits();
    if bits >> 63 == 1 { !bits } else { bits | (1 << 63) }
}

/// Parse a timestamp from the formats uploaded datasets actually carry:
/// ISO datetime (with or without the 'T') and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_float_keys_follow_numeric_order() {
        let values = [-100.5, -1.0, 0.0, 0.5, 2.0, 1e9];
        let keys: Vec<ValueKey> = values.iter().map(|v| Value::Float(*v).key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_key_distinguishes_null() {
        assert_ne!(Value::Null.key(), Value::Int(0).key());
        assert_ne!(Value::Text(String::new()).key(), Value::Null.key());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2023-01-15").is_some());
        assert!(parse_timestamp("2023-01-15T10:30:00").is_some());
        assert!(parse_timestamp("2023-01-15 10:30:00").is_some());
        assert!(parse_timestamp("15/01/2023").is_none());
    }

    #[test]
    fn test_render_roundtrip_friendly() {
        assert_eq!(Value::Int(42).render(), "42");
        assert_eq!(Value::Bool(false).render(), "false");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(
            Value::Timestamp(parse_timestamp("2023-01-15").unwrap()).render(),
            "2023-01-15T00:00:00"
        );
    }
}
