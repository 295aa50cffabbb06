// tabula-core/src/application/transforms/missing.rs

use crate::application::transforms::{Outcome, mean, quantile, sorted_numeric};
use crate::domain::dataset::{DataType, Table, Value, ValueKey, parse_timestamp};
use crate::domain::error::DomainError;
use std::collections::HashMap;

/// Drop every row with a missing cell in any of the target columns.
pub(crate) fn drop_rows(table: &Table, targets: &[usize]) -> Outcome {
    let keep: Vec<bool> = (0..table.row_count())
        .map(|row| {
            targets
                .iter()
                .all(|&col| !table.columns()[col].values[row].is_null())
        })
        .collect();

    let mut out = table.clone();
    out.retain_rows(&keep);
    Outcome::plain(out)
}

/// Drop target columns whose missing fraction exceeds `threshold`.
pub(crate) fn drop_columns(table: &Table, targets: &[usize], threshold: f64) -> Outcome {
    let rows = table.row_count();
    let mut out = table.clone();
    if rows == 0 {
        return Outcome::plain(out);
    }

    let names: Vec<String> = targets
        .iter()
        .map(|&i| table.columns()[i].name.clone())
        .collect();
    for name in names {
        let fraction = match out.column(&name) {
            Some(col) => col.missing_count() as f64 / rows as f64,
            None => continue,
        };
        if fraction > threshold {
            out.remove_column(&name);
        }
    }
    Outcome::plain(out)
}

pub(crate) enum NumericFill {
    Mean,
    Median,
}

/// Fill missing cells of numeric target columns with a statistic computed
/// over the non-missing cells. A 100%-missing column has no statistic and
/// fails instead of inventing one. Integer columns are promoted to float
/// when a fractional fill lands in them.
pub(crate) fn fill_statistic(
    table: &Table,
    targets: &[usize],
    fill: NumericFill,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    for &idx in targets {
        let (fill_value, missing) = {
            let col = &out.columns()[idx];
            let missing = col.missing_count();
            if missing == 0 {
                continue;
            }
            let xs = sorted_numeric(col);
            let stat = match fill {
                NumericFill::Mean => mean(&xs),
                NumericFill::Median => quantile(&xs, 0.5),
            };
            let Some(stat) = stat else {
                return Err(DomainError::InsufficientData {
                    column: col.name.clone(),
                    reason: "column is 100% missing, no statistic to fill with".to_string(),
                });
            };
            (stat, missing)
        };
        debug_assert!(missing > 0);

        let col = out.column_mut(idx);
        col.dtype = DataType::Float;
        for value in &mut col.values {
            match value {
                Value::Null => *value = Value::Float(fill_value),
                Value::Int(i) => *value = Value::Float(*i as f64),
                _ => {}
            }
        }
    }
    Ok(Outcome::plain(out))
}

/// Fill missing cells with the most frequent non-missing value. Ties pick
/// the value seen first, which keeps replay deterministic.
pub(crate) fn fill_mode(table: &Table, targets: &[usize]) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    for &idx in targets {
        let mode = {
            let col = &out.columns()[idx];
            if col.missing_count() == 0 {
                continue;
            }

            let mut counts: HashMap<ValueKey, (usize, usize, Value)> = HashMap::new();
            for (pos, value) in col.values.iter().enumerate() {
                if value.is_null() {
                    continue;
                }
                let entry = counts
                    .entry(value.key())
                    .or_insert_with(|| (0, pos, value.clone()));
                entry.0 += 1;
            }

            let best = counts
                .into_values()
                .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
            let Some((_, _, mode)) = best else {
                return Err(DomainError::InsufficientData {
                    column: col.name.clone(),
                    reason: "column is 100% missing, no mode to fill with".to_string(),
                });
            };
            mode
        };

        for value in &mut out.column_mut(idx).values {
            if value.is_null() {
                *value = mode.clone();
            }
        }
    }
    Ok(Outcome::plain(out))
}

/// Fill missing cells with a caller-supplied constant, coerced to the
/// column's declared type. An incompatible constant is a `TypeMismatch`,
/// not a silent coercion.
pub(crate) fn fill_constant(
    table: &Table,
    targets: &[usize],
    fill_value: &serde_json::Value,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    for &idx in targets {
        let constant = {
            let col = &out.columns()[idx];
            if col.missing_count() == 0 {
                continue;
            }
            coerce_constant(fill_value, col.dtype).ok_or_else(|| DomainError::TypeMismatch {
                column: col.name.clone(),
                expected: col.dtype.to_string(),
                actual: json_type_name(fill_value).to_string(),
            })?
        };

        for value in &mut out.column_mut(idx).values {
            if value.is_null() {
                *value = constant.clone();
            }
        }
    }
    Ok(Outcome::plain(out))
}

fn coerce_constant(value: &serde_json::Value, dtype: DataType) -> Option<Value> {
    match dtype {
        DataType::Integer => value.as_i64().map(Value::Int),
        DataType::Float => value.as_f64().map(Value::Float),
        DataType::Boolean => value.as_bool().map(Value::Bool),
        DataType::Text => value.as_str().map(|s| Value::Text(s.to_string())),
        DataType::Timestamp => value
            .as_str()
            .and_then(parse_timestamp)
            .map(Value::Timestamp),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

pub(crate) enum FillDirection {
    Forward,
    Backward,
}

/// Propagate the nearest observed value forward (or backward) into gaps.
/// Leading (resp. trailing) gaps have nothing to copy and stay missing.
pub(crate) fn directional_fill(table: &Table, targets: &[usize], dir: FillDirection) -> Outcome {
    let mut out = table.clone();
    for &idx in targets {
        let col = out.column_mut(idx);
        let mut carried: Option<Value> = None;

        let mut fill_at = |value: &mut Value| {
            if value.is_null() {
                if let Some(prev) = &carried {
                    *value = prev.clone();
                }
            } else {
                carried = Some(value.clone());
            }
        };

        match dir {
            FillDirection::Forward => col.values.iter_mut().for_each(&mut fill_at),
            FillDirection::Backward => col.values.iter_mut().rev().for_each(&mut fill_at),
        }
    }
    Outcome::plain(out)
}

/// Linear interpolation over interior gaps of numeric columns. Leading gaps
/// stay missing; trailing gaps carry the last known value forward.
pub(crate) fn interpolate(table: &Table, targets: &[usize]) -> Outcome {
    let mut out = table.clone();
    for &idx in targets {
        let known: Vec<(usize, f64)> = {
            let col = &out.columns()[idx];
            if col.missing_count() == 0 {
                continue;
            }
            col.values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_f64().map(|x| (i, x)))
                .collect()
        };
        if known.is_empty() {
            continue;
        }

        let col = out.column_mut(idx);
        col.dtype = DataType::Float;
        let mut cursor = 0usize; // index into `known`: last known point at or before the row
        for (row, value) in col.values.iter_mut().enumerate() {
            while cursor + 1 < known.len() && known[cursor + 1].0 <= row {
                cursor += 1;
            }
            match value {
                Value::Int(i) => *value = Value::Float(*i as f64),
                Value::Null => {
                    let filled = if row < known[0].0 {
                        None // leading gap
                    } else if cursor + 1 < known.len() {
                        let (x0, y0) = known[cursor];
                        let (x1, y1) = known[cursor + 1];
                        let t = (row - x0) as f64 / (x1 - x0) as f64;
                        Some(y0 + t * (y1 - y0))
                    } else {
                        Some(known[cursor].1) // trailing gap carries the last value
                    };
                    if let Some(x) = filled {
                        *value = Value::Float(x);
                    }
                }
                _ => {}
            }
        }
    }
    Outcome::plain(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    fn numeric_table(values: Vec<Value>) -> Table {
        Table::from_columns(vec![Column::new("x", DataType::Integer, values)]).unwrap()
    }

    #[test]
    fn test_drop_rows_keeps_complete_rows_in_order() {
        let table = numeric_table(vec![Value::Int(1), Value::Null, Value::Int(3)]);
        let out = drop_rows(&table, &[0]).table;
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.columns()[0].values, vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_drop_columns_uses_missing_fraction() {
        let table = Table::from_columns(vec![
            Column::new(
                "mostly_missing",
                DataType::Integer,
                vec![Value::Null, Value::Null, Value::Int(1)],
            ),
            Column::new(
                "complete",
                DataType::Integer,
                vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            ),
        ])
        .unwrap();

        let out = drop_columns(&table, &[0, 1], 0.5).table;
        assert!(!out.contains_column("mostly_missing"));
        assert!(out.contains_column("complete"));
    }

    #[test]
    fn test_fill_mean_matches_reference_scenario() {
        // [1, 2, missing, 4] -> mean of (1,2,4) = 2.333...
        let table = numeric_table(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Null,
            Value::Int(4),
        ]);
        let out = fill_statistic(&table, &[0], NumericFill::Mean).unwrap().table;

        let expected = 7.0 / 3.0;
        match &out.columns()[0].values[2] {
            Value::Float(f) => assert!((f - expected).abs() < 1e-12),
            other => panic!("expected filled float, got {:?}", other),
        }
        assert_eq!(out.row_count(), 4);
        assert_eq!(out.columns()[0].dtype, DataType::Float);
    }

    #[test]
    fn test_fill_mean_all_missing_is_insufficient_data() {
        let table = numeric_table(vec![Value::Null, Value::Null]);
        let result = fill_statistic(&table, &[0], NumericFill::Mean);
        assert!(matches!(result, Err(DomainError::InsufficientData { .. })));
    }

    #[test]
    fn test_fill_mode_prefers_first_seen_on_tie() {
        let table = Table::from_columns(vec![Column::new(
            "s",
            DataType::Text,
            vec![
                Value::Text("b".into()),
                Value::Text("a".into()),
                Value::Text("a".into()),
                Value::Text("b".into()),
                Value::Null,
            ],
        )])
        .unwrap();
        let out = fill_mode(&table, &[0]).unwrap().table;
        assert_eq!(out.columns()[0].values[4], Value::Text("b".into()));
    }

    #[test]
    fn test_fill_constant_type_mismatch() {
        let table = numeric_table(vec![Value::Int(1), Value::Null]);
        let result = fill_constant(&table, &[0], &serde_json::json!("zero"));
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
    }

    #[test]
    fn test_forward_fill_leaves_leading_gap() {
        let table = numeric_table(vec![Value::Null, Value::Int(5), Value::Null, Value::Int(7)]);
        let out = directional_fill(&table, &[0], FillDirection::Forward).table;
        assert_eq!(
            out.columns()[0].values,
            vec![Value::Null, Value::Int(5), Value::Int(5), Value::Int(7)]
        );
    }

    #[test]
    fn test_backward_fill_leaves_trailing_gap() {
        let table = numeric_table(vec![Value::Null, Value::Int(5), Value::Null]);
        let out = directional_fill(&table, &[0], FillDirection::Backward).table;
        assert_eq!(
            out.columns()[0].values,
            vec![Value::Int(5), Value::Int(5), Value::Null]
        );
    }

    #[test]
    fn test_interpolate_interior_and_trailing() {
        let table = numeric_table(vec![
            Value::Null,
            Value::Int(1),
            Value::Null,
            Value::Int(3),
            Value::Null,
        ]);
        let out = interpolate(&table, &[0]).table;
        assert_eq!(out.columns()[0].values[0], Value::Null);
        assert_eq!(out.columns()[0].values[2], Value::Float(2.0));
        assert_eq!(out.columns()[0].values[4], Value::Float(3.0));
    }
}
