// tabula-core/src/application/transforms/features.rs
//
// Column-producing feature engineering. Every operation here appends new
// columns (collision-suffixed via ColumnAppender) and leaves existing data
// untouched.

use std::collections::HashMap;

use chrono::Datelike;

use crate::application::transforms::{
    ColumnAppender, Outcome, SPREAD_EPSILON, mean, quantile, sorted_numeric, stddev_sample,
};
use crate::domain::dataset::{DataType, Table, Value, ValueKey};
use crate::domain::error::DomainError;
use crate::domain::ops::OperationKind;

const DIV_EPSILON: f64 = 1e-10;

/// `{col}_pow{d}` for every degree 2..=degree.
pub(crate) fn polynomial(
    table: &Table,
    targets: &[usize],
    degree: u32,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        for d in 2..=degree {
            let values: Vec<Value> = col
                .values
                .iter()
                .map(|v| float_or_null(v.as_f64().map(|x| x.powi(d as i32))))
                .collect();
            appender.push(&mut out, format!("{}_pow{}", col.name, d), DataType::Float, values)?;
        }
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// Product, quotient, sum and difference of exactly two numeric columns.
pub(crate) fn interaction(
    table: &Table,
    left_idx: usize,
    right_idx: usize,
) -> Result<Outcome, DomainError> {
    let left = &table.columns()[left_idx];
    let right = &table.columns()[right_idx];

    let combine = |f: fn(f64, f64) -> f64| -> Vec<Value> {
        left.values
            .iter()
            .zip(&right.values)
            .map(|(a, b)| match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => float_or_null(Some(f(x, y))),
                _ => Value::Null,
            })
            .collect()
    };

    let pairs: [(String, Vec<Value>); 4] = [
        (format!("{}_x_{}", left.name, right.name), combine(|x, y| x * y)),
        (
            format!("{}_div_{}", left.name, right.name),
            combine(|x, y| x / (y + DIV_EPSILON)),
        ),
        (format!("{}_plus_{}", left.name, right.name), combine(|x, y| x + y)),
        (
            format!("{}_minus_{}", left.name, right.name),
            combine(|x, y| x - y),
        ),
    ];

    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for (name, values) in pairs {
        appender.push(&mut out, name, DataType::Float, values)?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

pub(crate) enum LogBase {
    Natural,
    Ten,
    Two,
}

/// log(x + 1) in the requested base; non-positive arguments become missing.
pub(crate) fn log_transform(
    table: &Table,
    targets: &[usize],
    base: LogBase,
) -> Result<Outcome, DomainError> {
    let (suffix, log): (&str, fn(f64) -> f64) = match base {
        LogBase::Natural => ("log", f64::ln),
        LogBase::Ten => ("log10", f64::log10),
        LogBase::Two => ("log2", f64::log2),
    };

    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let values: Vec<Value> = col
            .values
            .iter()
            .map(|v| match v.as_f64() {
                Some(x) if x + 1.0 > 0.0 => float_or_null(Some(log(x + 1.0))),
                _ => Value::Null,
            })
            .collect();
        appender.push(&mut out, format!("{}_{}", col.name, suffix), DataType::Float, values)?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// sqrt(|x|): sign-insensitive, so negative measurements stay usable.
pub(crate) fn sqrt_transform(table: &Table, targets: &[usize]) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let values: Vec<Value> = col
            .values
            .iter()
            .map(|v| float_or_null(v.as_f64().map(|x| x.abs().sqrt())))
            .collect();
        appender.push(&mut out, format!("{}_sqrt", col.name), DataType::Float, values)?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// x^p; non-finite results (e.g. negative base with fractional exponent)
/// become missing.
pub(crate) fn power_transform(
    table: &Table,
    targets: &[usize],
    exponent: f64,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let values: Vec<Value> = col
            .values
            .iter()
            .map(|v| float_or_null(v.as_f64().map(|x| x.powf(exponent))))
            .collect();
        appender.push(
            &mut out,
            format!("{}_pow{}", col.name, format_exponent(exponent)),
            DataType::Float,
            values,
        )?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

fn format_exponent(p: f64) -> String {
    if p.fract() == 0.0 && p.abs() < 1e15 {
        format!("{}", p as i64)
    } else {
        format!("{}", p)
    }
}

pub(crate) enum BinStrategy {
    Uniform,
    Quantile,
}

/// `{col}_binned`: integer bin index per row. Uniform strategy cuts the
/// observed range into equal widths; quantile strategy cuts at value
/// quantiles (duplicate edges collapse, as qcut does with duplicates=drop).
pub(crate) fn bin(
    table: &Table,
    targets: &[usize],
    bins: usize,
    strategy: BinStrategy,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let xs = sorted_numeric(col);
        if xs.is_empty() {
            return Err(DomainError::InsufficientData {
                column: col.name.clone(),
                reason: "cannot bin a 100% missing column".to_string(),
            });
        }

        let assign: Box<dyn Fn(f64) -> i64> = match strategy {
            BinStrategy::Uniform => {
                let min = xs[0];
                let max = xs[xs.len() - 1];
                let width = (max - min) / bins as f64;
                let top = bins as i64 - 1;
                Box::new(move |x: f64| {
                    if width <= SPREAD_EPSILON {
                        0
                    } else {
                        (((x - min) / width).floor() as i64).clamp(0, top)
                    }
                })
            }
            BinStrategy::Quantile => {
                let mut edges: Vec<f64> = (1..bins)
                    .filter_map(|i| quantile(&xs, i as f64 / bins as f64))
                    .collect();
                edges.dedup();
                Box::new(move |x: f64| edges.partition_point(|e| *e < x) as i64)
            }
        };

        let values: Vec<Value> = col
            .values
            .iter()
            .map(|v| match v.as_f64() {
                Some(x) => Value::Int(assign(x)),
                None => Value::Null,
            })
            .collect();
        appender.push(&mut out, format!("{}_binned", col.name), DataType::Integer, values)?;
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// Eight calendar features per timestamp target. dayofweek counts Monday
/// as 0.
pub(crate) fn date_extract(table: &Table, targets: &[usize]) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let dates: Vec<Option<chrono::NaiveDate>> = col
            .values
            .iter()
            .map(|v| match v {
                Value::Timestamp(ts) => Some(ts.date()),
                _ => None,
            })
            .collect();

        let int_feature = |f: &dyn Fn(chrono::NaiveDate) -> i64| -> Vec<Value> {
            dates
                .iter()
                .map(|d| d.map_or(Value::Null, |d| Value::Int(f(d))))
                .collect()
        };
        let bool_feature = |f: &dyn Fn(chrono::NaiveDate) -> bool| -> Vec<Value> {
            dates
                .iter()
                .map(|d| d.map_or(Value::Null, |d| Value::Bool(f(d))))
                .collect()
        };

        let features: [(&str, DataType, Vec<Value>); 8] = [
            ("year", DataType::Integer, int_feature(&|d| d.year() as i64)),
            ("month", DataType::Integer, int_feature(&|d| d.month() as i64)),
            ("day", DataType::Integer, int_feature(&|d| d.day() as i64)),
            (
                "dayofweek",
                DataType::Integer,
                int_feature(&|d| d.weekday().num_days_from_monday() as i64),
            ),
            (
                "quarter",
                DataType::Integer,
                int_feature(&|d| ((d.month() - 1) / 3 + 1) as i64),
            ),
            (
                "is_weekend",
                DataType::Boolean,
                bool_feature(&|d| d.weekday().num_days_from_monday() >= 5),
            ),
            (
                "is_month_start",
                DataType::Boolean,
                bool_feature(&|d| d.day() == 1),
            ),
            (
                "is_month_end",
                DataType::Boolean,
                bool_feature(&|d| d.succ_opt().is_none_or(|next| next.month() != d.month())),
            ),
        ];

        for (suffix, dtype, values) in features {
            appender.push(&mut out, format!("{}_{}", col.name, suffix), dtype, values)?;
        }
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AggFn {
    Mean,
    Std,
    Min,
    Max,
    Count,
}

impl AggFn {
    pub(crate) fn parse(name: &str, operation: OperationKind) -> Result<Self, DomainError> {
        match name {
            "mean" => Ok(Self::Mean),
            "std" => Ok(Self::Std),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            other => Err(DomainError::InvalidParameters {
                operation: operation.to_string(),
                reason: format!(
                    "unknown aggregation '{}' (expected mean, std, min, max or count)",
                    other
                ),
            }),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        }
    }

    /// None encodes a missing result (e.g. std of a single observation).
    fn compute(self, xs: &[f64]) -> Option<f64> {
        match self {
            Self::Mean => mean(xs),
            Self::Std => stddev_sample(xs),
            Self::Min => xs.iter().copied().reduce(f64::min),
            Self::Max => xs.iter().copied().reduce(f64::max),
            Self::Count => Some(xs.len() as f64),
        }
    }

    fn output_dtype(self) -> DataType {
        match self {
            Self::Count => DataType::Integer,
            _ => DataType::Float,
        }
    }

    fn wrap(self, x: f64) -> Value {
        match self {
            Self::Count => Value::Int(x as i64),
            _ => Value::Float(x),
        }
    }
}

/// Group-broadcast statistics: `{col}_{agg}_by_{group}` holds the group
/// statistic of each row's group. Rows whose group key is missing get a
/// missing result, matching grouped transforms that skip null keys.
pub(crate) fn aggregate(
    table: &Table,
    targets: &[usize],
    group_idx: usize,
    aggs: &[AggFn],
) -> Result<Outcome, DomainError> {
    let group_col = &table.columns()[group_idx];
    let group_name = group_col.name.clone();
    let group_keys: Vec<Option<ValueKey>> = group_col
        .values
        .iter()
        .map(|v| (!v.is_null()).then(|| v.key()))
        .collect();

    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let mut grouped: HashMap<&ValueKey, Vec<f64>> = HashMap::new();
        for (row, key) in group_keys.iter().enumerate() {
            if let (Some(key), Some(x)) = (key.as_ref(), col.values[row].as_f64()) {
                grouped.entry(key).or_default().push(x);
            }
        }

        for &agg in aggs {
            let stats: HashMap<&ValueKey, Option<f64>> = grouped
                .iter()
                .map(|(key, xs)| (*key, agg.compute(xs)))
                .collect();
            let values: Vec<Value> = group_keys
                .iter()
                .map(|key| {
                    key.as_ref()
                        .and_then(|k| stats.get(k).copied().flatten())
                        .map_or(Value::Null, |x| agg.wrap(x))
                })
                .collect();
            appender.push(
                &mut out,
                format!("{}_{}_by_{}", col.name, agg.as_str(), group_name),
                agg.output_dtype(),
                values,
            )?;
        }
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

/// Trailing-window statistics: `{col}_rolling{window}_{agg}`. The result is
/// missing until a full window of non-missing values is available.
pub(crate) fn rolling_window(
    table: &Table,
    targets: &[usize],
    window: usize,
    aggs: &[AggFn],
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    let mut appender = ColumnAppender::new();
    for &idx in targets {
        let col = &table.columns()[idx];
        let cells: Vec<Option<f64>> = col.values.iter().map(Value::as_f64).collect();

        for &agg in aggs {
            let values: Vec<Value> = (0..cells.len())
                .map(|row| {
                    if row + 1 < window {
                        return Value::Null;
                    }
                    let slice = &cells[row + 1 - window..=row];
                    let xs: Vec<f64> = slice.iter().copied().flatten().collect();
                    if xs.len() < window {
                        return Value::Null; // a gap inside the window
                    }
                    agg.compute(&xs).map_or(Value::Null, |x| agg.wrap(x))
                })
                .collect();
            appender.push(
                &mut out,
                format!("{}_rolling{}_{}", col.name, window, agg.as_str()),
                agg.output_dtype(),
                values,
            )?;
        }
    }
    Ok(Outcome {
        table: out,
        renames: appender.into_renames(),
    })
}

fn float_or_null(x: Option<f64>) -> Value {
    match x {
        Some(v) if v.is_finite() => Value::Float(v),
        _ => Value::Null,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, parse_timestamp};

    fn float_column(name: &str, values: &[f64]) -> Column {
        Column::new(
            name,
            DataType::Float,
            values.iter().map(|v| Value::Float(*v)).collect(),
        )
    }

    #[test]
    fn test_polynomial_adds_one_column_per_degree() {
        let table = Table::from_columns(vec![float_column("x", &[2.0, 3.0])]).unwrap();
        let out = polynomial(&table, &[0], 3).unwrap().table;
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            vec!["x", "x_pow2", "x_pow3"]
        );
        assert_eq!(out.column("x_pow3").unwrap().values[1], Value::Float(27.0));
    }

    #[test]
    fn test_interaction_produces_four_features() {
        let table = Table::from_columns(vec![
            float_column("a", &[6.0, 8.0]),
            float_column("b", &[2.0, 4.0]),
        ])
        .unwrap();
        let out = interaction(&table, 0, 1).unwrap().table;
        assert_eq!(out.column("a_x_b").unwrap().values[0], Value::Float(12.0));
        assert_eq!(out.column("a_plus_b").unwrap().values[1], Value::Float(12.0));
        assert_eq!(out.column("a_minus_b").unwrap().values[0], Value::Float(4.0));
        match out.column("a_div_b").unwrap().values[0] {
            Value::Float(f) => assert!((f - 3.0).abs() < 1e-8),
            ref other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_log_transform_shifts_by_one() {
        let table = Table::from_columns(vec![float_column("x", &[0.0, 9.0, -5.0])]).unwrap();
        let out = log_transform(&table, &[0], LogBase::Ten).unwrap().table;
        let values = &out.column("x_log10").unwrap().values;
        assert_eq!(values[0], Value::Float(0.0));
        assert_eq!(values[1], Value::Float(1.0));
        // -5 + 1 <= 0 -> missing
        assert_eq!(values[2], Value::Null);
    }

    #[test]
    fn test_power_transform_names_integral_exponent() {
        let table = Table::from_columns(vec![float_column("x", &[3.0])]).unwrap();
        let out = power_transform(&table, &[0], 2.0).unwrap().table;
        assert!(out.contains_column("x_pow2"));
        assert_eq!(out.column("x_pow2").unwrap().values[0], Value::Float(9.0));
    }

    #[test]
    fn test_uniform_bin_assigns_range_buckets() {
        let table = Table::from_columns(vec![float_column("x", &[0.0, 2.5, 5.0, 7.5, 10.0])]).unwrap();
        let out = bin(&table, &[0], 4, BinStrategy::Uniform).unwrap().table;
        assert_eq!(
            out.column("x_binned").unwrap().values,
            vec![
                Value::Int(0),
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Int(3)
            ]
        );
    }

    #[test]
    fn test_quantile_bin_balances_counts() {
        let table =
            Table::from_columns(vec![float_column("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]).unwrap();
        let out = bin(&table, &[0], 2, BinStrategy::Quantile).unwrap().table;
        let values = &out.column("x_binned").unwrap().values;
        let low = values.iter().filter(|v| **v == Value::Int(0)).count();
        let high = values.iter().filter(|v| **v == Value::Int(1)).count();
        assert_eq!(low, 3);
        assert_eq!(high, 3);
    }

    #[test]
    fn test_date_extract_features() {
        // 2023-04-01 was a Saturday
        let table = Table::from_columns(vec![Column::new(
            "d",
            DataType::Timestamp,
            vec![
                Value::Timestamp(parse_timestamp("2023-04-01").unwrap()),
                Value::Null,
            ],
        )])
        .unwrap();
        let out = date_extract(&table, &[0]).unwrap().table;
        assert_eq!(out.column("d_year").unwrap().values[0], Value::Int(2023));
        assert_eq!(out.column("d_quarter").unwrap().values[0], Value::Int(2));
        assert_eq!(out.column("d_dayofweek").unwrap().values[0], Value::Int(5));
        assert_eq!(out.column("d_is_weekend").unwrap().values[0], Value::Bool(true));
        assert_eq!(out.column("d_is_month_start").unwrap().values[0], Value::Bool(true));
        assert_eq!(out.column("d_is_month_end").unwrap().values[0], Value::Bool(false));
        // Null dates propagate through every feature
        assert_eq!(out.column("d_month").unwrap().values[1], Value::Null);
    }

    #[test]
    fn test_aggregate_broadcasts_group_means() {
        let table = Table::from_columns(vec![
            Column::new(
                "city",
                DataType::Text,
                vec![
                    Value::Text("lyon".into()),
                    Value::Text("lyon".into()),
                    Value::Text("nice".into()),
                    Value::Null,
                ],
            ),
            float_column("spend", &[10.0, 20.0, 40.0, 99.0]),
        ])
        .unwrap();

        let out = aggregate(&table, &[1], 0, &[AggFn::Mean, AggFn::Count])
            .unwrap()
            .table;
        let means = &out.column("spend_mean_by_city").unwrap().values;
        assert_eq!(means[0], Value::Float(15.0));
        assert_eq!(means[1], Value::Float(15.0));
        assert_eq!(means[2], Value::Float(40.0));
        // Null group key -> null result
        assert_eq!(means[3], Value::Null);
        assert_eq!(
            out.column("spend_count_by_city").unwrap().values[0],
            Value::Int(2)
        );
    }

    #[test]
    fn test_rolling_mean_waits_for_full_window() {
        let table = Table::from_columns(vec![float_column("x", &[1.0, 2.0, 3.0, 4.0])]).unwrap();
        let out = rolling_window(&table, &[0], 2, &[AggFn::Mean]).unwrap().table;
        assert_eq!(
            out.column("x_rolling2_mean").unwrap().values,
            vec![
                Value::Null,
                Value::Float(1.5),
                Value::Float(2.5),
                Value::Float(3.5)
            ]
        );
    }

    #[test]
    fn test_rolling_window_gap_produces_null() {
        let table = Table::from_columns(vec![Column::new(
            "x",
            DataType::Float,
            vec![Value::Float(1.0), Value::Null, Value::Float(3.0)],
        )])
        .unwrap();
        let out = rolling_window(&table, &[0], 2, &[AggFn::Mean]).unwrap().table;
        assert_eq!(
            out.column("x_rolling2_mean").unwrap().values,
            vec![Value::Null, Value::Null, Value::Null]
        );
    }
}
