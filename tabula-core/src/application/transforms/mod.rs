// tabula-core/src/application/transforms/mod.rs
//
// One module per operation family. Every function here takes the input
// table by reference and returns a brand-new table; nothing in this tree
// mutates caller state.

pub(crate) mod cleaning;
pub(crate) mod encoding;
pub(crate) mod features;
pub(crate) mod missing;
pub(crate) mod outliers;
pub(crate) mod scaling;

use std::cmp::Ordering;

use crate::domain::dataset::{Column, DataType, Table, Value};
use crate::domain::error::DomainError;
use crate::domain::lineage::ColumnRename;

/// Spread smaller than this counts as zero (degenerate scale / stddev).
pub(crate) const SPREAD_EPSILON: f64 = 1e-12;

/// What a transform hands back to the executor.
pub(crate) struct Outcome {
    pub table: Table,
    pub renames: Vec<ColumnRename>,
}

impl Outcome {
    pub fn plain(table: Table) -> Self {
        Self {
            table,
            renames: Vec::new(),
        }
    }
}

pub(crate) fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Population standard deviation (ddof = 0).
pub(crate) fn stddev_population(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    Some(var.sqrt())
}

/// Sample standard deviation (ddof = 1); None below two observations.
pub(crate) fn stddev_sample(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Linear-interpolation quantile over an already-sorted slice (the numpy
/// convention, which the IQR reference values assume).
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

/// Non-missing numeric values of a column, sorted ascending.
pub(crate) fn sorted_numeric(column: &Column) -> Vec<f64> {
    let mut xs = column.numeric_values();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    xs
}

/// Appends freshly created columns, deflecting name collisions with a
/// numeric suffix and keeping track of every rename for the lineage record.
pub(crate) struct ColumnAppender {
    renames: Vec<ColumnRename>,
}

impl ColumnAppender {
    pub fn new() -> Self {
        Self {
            renames: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        table: &mut Table,
        requested: String,
        dtype: DataType,
        values: Vec<Value>,
    ) -> Result<(), DomainError> {
        let actual = if table.contains_column(&requested) {
            let mut n = 2;
            let mut candidate = format!("{}_{}", requested, n);
            while table.contains_column(&candidate) {
                n += 1;
                candidate = format!("{}_{}", requested, n);
            }
            candidate
        } else {
            requested.clone()
        };

        if actual != requested {
            self.renames.push(ColumnRename {
                requested,
                actual: actual.clone(),
            });
        }
        table.push_column(Column::new(actual, dtype, values))
    }

    pub fn into_renames(self) -> Vec<ColumnRename> {
        self.renames
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_matches_linear_interpolation() {
        // Sorted [1,2,3,4,5,100]: Q1 = 2.25, Q3 = 4.75
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!((quantile(&xs, 0.25).unwrap() - 2.25).abs() < 1e-12);
        assert!((quantile(&xs, 0.75).unwrap() - 4.75).abs() < 1e-12);
        assert!((quantile(&xs, 0.5).unwrap() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_empty_is_none() {
        assert!(quantile(&[], 0.5).is_none());
    }

    #[test]
    fn test_stddev_population_vs_sample() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev_population(&xs).unwrap() - 2.0).abs() < 1e-12);
        assert!(stddev_sample(&xs).unwrap() > 2.0);
        assert!(stddev_sample(&[1.0]).is_none());
    }

    #[test]
    fn test_appender_suffixes_collisions() {
        let mut table = Table::from_columns(vec![Column::new(
            "x",
            DataType::Integer,
            vec![Value::Int(1)],
        )])
        .unwrap();

        let mut appender = ColumnAppender::new();
        appender
            .push(&mut table, "x".to_string(), DataType::Float, vec![Value::Float(1.0)])
            .unwrap();
        appender
            .push(&mut table, "x".to_string(), DataType::Float, vec![Value::Float(2.0)])
            .unwrap();

        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["x", "x_2", "x_3"]);

        let renames = appender.into_renames();
        assert_eq!(renames.len(), 2);
        assert_eq!(renames[0].actual, "x_2");
        assert_eq!(renames[1].actual, "x_3");
    }
}
