// tabula-core/src/application/transforms/encoding.rs

use std::collections::{BTreeMap, HashMap};

use crate::application::transforms::{ColumnAppender, Outcome};
use crate::domain::dataset::{DataType, Table, Value, ValueKey};
use crate::domain::error::DomainError;

/// Replace each target column with integer codes. Classes are the distinct
/// non-missing values in sorted order, coded 0..n-1; missing stays missing.
pub(crate) fn label_encode(table: &Table, targets: &[usize]) -> Outcome {
    let mut out = table.clone();
    for &idx in targets {
        let classes: BTreeMap<ValueKey, i64> = {
            let col = &out.columns()[idx];
            let distinct: std::collections::BTreeSet<ValueKey> = col
                .values
                .iter()
                .filter(|v| !v.is_null())
                .map(Value::key)
                .collect();
            distinct
                .into_iter()
                .enumerate()
                .map(|(code, key)| (key, code as i64))
                .collect()
        };

        let col = out.column_mut(idx);
        col.dtype = DataType::Integer;
        for value in &mut col.values {
            if value.is_null() {
                continue;
            }
            // Key is present by construction of `classes`.
            let code = classes.get(&value.key()).copied().unwrap_or_default();
            *value = Value::Int(code);
        }
    }
    Outcome::plain(out)
}

/// One indicator column per category observed in the current table, named
/// `{column}_{category}` in sorted category order; the source column is
/// removed. Rows with a missing source cell get all-false indicators.
///
/// Cardinality is checked for every target BEFORE any column is touched, so
/// a rejection leaves nothing half-encoded.
pub(crate) fn onehot_encode(
    table: &Table,
    targets: &[usize],
    ceiling: usize,
) -> Result<Outcome, DomainError> {
    let mut plans: Vec<(String, Vec<(ValueKey, String)>)> = Vec::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let mut categories: BTreeMap<ValueKey, String> = BTreeMap::new();
        for value in &col.values {
            if !value.is_null() {
                categories.entry(value.key()).or_insert_with(|| value.render());
            }
        }
        if categories.len() > ceiling {
            return Err(DomainError::CardinalityTooHigh {
                column: col.name.clone(),
                cardinality: categories.len(),
                ceiling,
            });
        }
        plans.push((col.name.clone(), categories.into_iter().collect()));
    }

    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for (name, categories) in plans {
        let Some(source) = out.remove_column(&name) else {
            continue;
        };
        for (key, label) in categories {
            let values: Vec<Value> = source
                .values
                .iter()
                .map(|v| Value::Bool(!v.is_null() && v.key() == key))
                .collect();
            appender.push(&mut out, format!("{}_{}", name, label), DataType::Boolean, values)?;
        }
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// Add `{column}_freq`: the relative frequency of each cell's value among
/// the non-missing cells of its column. The source column is kept.
pub(crate) fn frequency_encode(table: &Table, targets: &[usize]) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let (name, frequencies, total) = {
            let col = &table.columns()[idx];
            let mut counts: HashMap<ValueKey, usize> = HashMap::new();
            for value in &col.values {
                if !value.is_null() {
                    *counts.entry(value.key()).or_insert(0) += 1;
                }
            }
            let total: usize = counts.values().sum();
            (col.name.clone(), counts, total)
        };

        let values: Vec<Value> = table.columns()[idx]
            .values
            .iter()
            .map(|v| {
                if v.is_null() || total == 0 {
                    Value::Null
                } else {
                    let count = frequencies.get(&v.key()).copied().unwrap_or_default();
                    Value::Float(count as f64 / total as f64)
                }
            })
            .collect();
        appender.push(&mut out, format!("{}_freq", name), DataType::Float, values)?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    fn plan_table() -> Table {
        Table::from_columns(vec![Column::new(
            "plan",
            DataType::Text,
            vec![
                Value::Text("premium".into()),
                Value::Text("basic".into()),
                Value::Null,
                Value::Text("basic".into()),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn test_label_encode_sorts_classes() {
        let out = label_encode(&plan_table(), &[0]).table;
        // basic -> 0, premium -> 1
        assert_eq!(
            out.columns()[0].values,
            vec![Value::Int(1), Value::Int(0), Value::Null, Value::Int(0)]
        );
        assert_eq!(out.columns()[0].dtype, DataType::Integer);
    }

    #[test]
    fn test_onehot_replaces_source_with_indicators() {
        let out = onehot_encode(&plan_table(), &[0], 50).unwrap().table;
        let names: Vec<&str> = out.column_names().collect();
        assert_eq!(names, vec!["plan_basic", "plan_premium"]);
        assert_eq!(
            out.column("plan_basic").unwrap().values,
            vec![
                Value::Bool(false),
                Value::Bool(true),
                Value::Bool(false),
                Value::Bool(true)
            ]
        );
        // Missing source row -> all indicators false
        assert_eq!(out.column("plan_premium").unwrap().values[2], Value::Bool(false));
    }

    #[test]
    fn test_onehot_cardinality_ceiling() {
        let values: Vec<Value> = (0..60).map(|i| Value::Text(format!("cat_{}", i))).collect();
        let table =
            Table::from_columns(vec![Column::new("c", DataType::Text, values)]).unwrap();

        let result = onehot_encode(&table, &[0], 50);
        match result {
            Err(DomainError::CardinalityTooHigh {
                cardinality,
                ceiling,
                ..
            }) => {
                assert_eq!(cardinality, 60);
                assert_eq!(ceiling, 50);
            }
            other => panic!("expected CardinalityTooHigh, got {:?}", other.map(|o| o.table)),
        }
    }

    #[test]
    fn test_onehot_collision_gets_suffix() {
        let table = Table::from_columns(vec![
            Column::new(
                "plan",
                DataType::Text,
                vec![Value::Text("basic".into()), Value::Text("premium".into())],
            ),
            Column::new(
                "plan_basic",
                DataType::Integer,
                vec![Value::Int(9), Value::Int(9)],
            ),
        ])
        .unwrap();

        let outcome = onehot_encode(&table, &[0], 50).unwrap();
        assert!(outcome.table.contains_column("plan_basic_2"));
        assert_eq!(outcome.renames.len(), 1);
        assert_eq!(outcome.renames[0].requested, "plan_basic");
    }

    #[test]
    fn test_frequency_encode_keeps_source() {
        let out = frequency_encode(&plan_table(), &[0]).unwrap().table;
        assert!(out.contains_column("plan"));
        let freq = &out.column("plan_freq").unwrap().values;
        // 3 non-missing cells: premium 1/3, basic 2/3, null stays null
        assert_eq!(freq[2], Value::Null);
        match (&freq[0], &freq[1]) {
            (Value::Float(p), Value::Float(b)) => {
                assert!((p - 1.0 / 3.0).abs() < 1e-12);
                assert!((b - 2.0 / 3.0).abs() < 1e-12);
            }
            other => panic!("expected floats, got {:?}", other),
        }
    }
}
