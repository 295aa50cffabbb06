// tabula-core/src/application/transforms/cleaning.rs
//
// Deduplication, type conversion and text normalization.

use regex::Regex;
use std::collections::HashSet;

use crate::application::transforms::Outcome;
use crate::domain::dataset::{DataType, Table, Value, parse_timestamp};
use crate::domain::error::DomainError;
use crate::domain::ops::OperationKind;

/// Keep the first occurrence of each distinct row, where identity is taken
/// over the subset columns. Row order of survivors is untouched.
pub(crate) fn drop_duplicates(table: &Table, subset: &[usize]) -> Outcome {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = (0..table.row_count())
        .map(|row| seen.insert(table.row_key(row, subset)))
        .collect();

    let mut out = table.clone();
    out.retain_rows(&keep);
    Outcome::plain(out)
}

/// Convert target columns to a declared type. Unconvertible cells coerce to
/// missing rather than aborting the whole operation.
pub(crate) fn cast_column(table: &Table, targets: &[usize], target: DataType) -> Outcome {
    let mut out = table.clone();
    for &idx in targets {
        let col = out.column_mut(idx);
        if col.dtype == target {
            continue;
        }
        col.dtype = target;
        for value in &mut col.values {
            *value = convert(value, target);
        }
    }
    Outcome::plain(out)
}

fn convert(value: &Value, target: DataType) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match target {
        DataType::Integer => match value {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Int(f.trunc() as i64),
            Value::Bool(b) => Value::Int(i64::from(*b)),
            Value::Text(s) => s.trim().parse::<i64>().map_or(Value::Null, Value::Int),
            _ => Value::Null,
        },
        DataType::Float => match value {
            Value::Float(f) => Value::Float(*f),
            Value::Int(i) => Value::Float(*i as f64),
            Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().map_or(Value::Null, Value::Float),
            _ => Value::Null,
        },
        DataType::Boolean => match value {
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Bool(*i != 0),
            Value::Float(f) => Value::Bool(*f != 0.0),
            Value::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Value::Bool(true),
                "false" | "0" | "no" => Value::Bool(false),
                _ => Value::Null,
            },
            _ => Value::Null,
        },
        DataType::Text => Value::Text(value.render()),
        DataType::Timestamp => match value {
            Value::Timestamp(ts) => Value::Timestamp(*ts),
            Value::Text(s) => parse_timestamp(s.trim()).map_or(Value::Null, Value::Timestamp),
            _ => Value::Null,
        },
    }
}

pub(crate) enum TextCleanup {
    Lowercase,
    StripWhitespace,
    StripSpecialChars,
}

/// Normalize text cells in place (null cells pass through untouched).
pub(crate) fn text_clean(
    table: &Table,
    targets: &[usize],
    mode: TextCleanup,
) -> Result<Outcome, DomainError> {
    let pattern = match mode {
        TextCleanup::Lowercase => None,
        TextCleanup::StripWhitespace => Some((r"\s+", " ")),
        TextCleanup::StripSpecialChars => Some((r"[^a-zA-Z0-9\s]", "")),
    };
    let compiled = pattern
        .map(|(re, replacement)| Regex::new(re).map(|r| (r, replacement)))
        .transpose()
        .map_err(|e| DomainError::ExecutionError {
            operation: OperationKind::StripSpecialChars.to_string(),
            reason: e.to_string(),
        })?;

    let mut out = table.clone();
    for &idx in targets {
        for value in &mut out.column_mut(idx).values {
            let Value::Text(s) = value else { continue };
            let cleaned = match (&mode, &compiled) {
                (TextCleanup::Lowercase, _) => s.to_lowercase(),
                (_, Some((re, replacement))) => re.replace_all(s.trim(), *replacement).into_owned(),
                (_, None) => continue,
            };
            *value = Value::Text(cleaned);
        }
    }
    Ok(Outcome::plain(out))
}
