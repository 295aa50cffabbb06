// tabula-core/src/application/transforms/outliers.rs

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::application::transforms::{
    Outcome, SPREAD_EPSILON, mean, quantile, sorted_numeric, stddev_population,
};
use crate::domain::dataset::Table;

/// IQR fence removal: bounds = [Q1 - multiplier*IQR, Q3 + multiplier*IQR]
/// per target column, union of flags across columns. Rows with a missing
/// target cell are never flagged. Surviving rows keep their relative order.
pub(crate) fn iqr_remove(table: &Table, targets: &[usize], multiplier: f64) -> Outcome {
    let mut flagged = vec![false; table.row_count()];

    for &idx in targets {
        let col = &table.columns()[idx];
        let xs = sorted_numeric(col);
        let (Some(q1), Some(q3)) = (quantile(&xs, 0.25), quantile(&xs, 0.75)) else {
            continue;
        };
        let iqr = q3 - q1;
        let lower = q1 - multiplier * iqr;
        let upper = q3 + multiplier * iqr;

        for (row, value) in col.values.iter().enumerate() {
            if let Some(x) = value.as_f64()
                && (x < lower || x > upper)
            {
                flagged[row] = true;
            }
        }
    }

    retain_unflagged(table, &flagged)
}

/// Z-score removal: |x - mean| / stddev > threshold. A column with zero
/// spread has no outliers by definition, so it flags nothing rather than
/// dividing by zero.
pub(crate) fn zscore_remove(table: &Table, targets: &[usize], threshold: f64) -> Outcome {
    let mut flagged = vec![false; table.row_count()];

    for &idx in targets {
        let col = &table.columns()[idx];
        let xs = col.numeric_values();
        let (Some(m), Some(sd)) = (mean(&xs), stddev_population(&xs)) else {
            continue;
        };
        if sd <= SPREAD_EPSILON {
            continue;
        }

        for (row, value) in col.values.iter().enumerate() {
            if let Some(x) = value.as_f64()
                && ((x - m) / sd).abs() > threshold
            {
                flagged[row] = true;
            }
        }
    }

    retain_unflagged(table, &flagged)
}

const FOREST_TREES: usize = 100;
const FOREST_MAX_SAMPLES: usize = 256;
const FOREST_SEED: u64 = 42;

/// Isolation-forest removal over the rows that are complete in every target
/// column. The forest is seeded, so the same table and parameters always
/// flag the same rows and pipeline replay stays bit-identical. Removes the
/// floor(contamination * n) most anomalous complete rows.
pub(crate) fn isolation_forest_remove(
    table: &Table,
    targets: &[usize],
    contamination: f64,
) -> Outcome {
    let mut complete_rows = Vec::new();
    let mut data: Vec<Vec<f64>> = Vec::new();
    for row in 0..table.row_count() {
        let cells: Vec<Option<f64>> = targets
            .iter()
            .map(|&c| table.columns()[c].values[row].as_f64())
            .collect();
        if cells.iter().all(Option::is_some) {
            complete_rows.push(row);
            data.push(cells.into_iter().flatten().collect());
        }
    }

    let n = data.len();
    let to_remove = (contamination * n as f64).floor() as usize;
    if to_remove == 0 {
        return Outcome::plain(table.clone());
    }

    let scores = isolation_scores(&data);
    let mut ranked: Vec<usize> = (0..n).collect();
    ranked.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut flagged = vec![false; table.row_count()];
    for &i in ranked.iter().take(to_remove) {
        flagged[complete_rows[i]] = true;
    }
    retain_unflagged(table, &flagged)
}

fn retain_unflagged(table: &Table, flagged: &[bool]) -> Outcome {
    let keep: Vec<bool> = flagged.iter().map(|f| !f).collect();
    let mut out = table.clone();
    out.retain_rows(&keep);
    Outcome::plain(out)
}

// --- Isolation forest internals ---

enum IsoNode {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsoNode>,
        right: Box<IsoNode>,
    },
}

fn isolation_scores(data: &[Vec<f64>]) -> Vec<f64> {
    let n = data.len();
    let sample_size = n.min(FOREST_MAX_SAMPLES);
    let height_limit = (sample_size as f64).log2().ceil().max(1.0) as usize;
    let mut rng = StdRng::seed_from_u64(FOREST_SEED);

    let mut trees = Vec::with_capacity(FOREST_TREES);
    for _ in 0..FOREST_TREES {
        let mut indexes: Vec<usize> = (0..n).collect();
        indexes.shuffle(&mut rng);
        indexes.truncate(sample_size);
        trees.push(build_tree(data, &indexes, &mut rng, 0, height_limit));
    }

    let normalizer = average_path_length(sample_size);
    data.iter()
        .map(|row| {
            let avg: f64 = trees
                .iter()
                .map(|t| path_length(t, row, 0))
                .sum::<f64>()
                / trees.len() as f64;
            if normalizer <= 0.0 {
                0.5
            } else {
                2f64.powf(-avg / normalizer)
            }
        })
        .collect()
}

fn build_tree(
    data: &[Vec<f64>],
    rows: &[usize],
    rng: &mut StdRng,
    depth: usize,
    limit: usize,
) -> IsoNode {
    if rows.len() <= 1 || depth >= limit {
        return IsoNode::Leaf { size: rows.len() };
    }

    let n_features = data[rows[0]].len();
    let splittable: Vec<usize> = (0..n_features)
        .filter(|&f| {
            let (min, max) = feature_range(data, rows, f);
            max - min > SPREAD_EPSILON
        })
        .collect();
    if splittable.is_empty() {
        return IsoNode::Leaf { size: rows.len() };
    }

    let feature = splittable[rng.gen_range(0..splittable.len())];
    let (min, max) = feature_range(data, rows, feature);
    let threshold = rng.gen_range(min..max);

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&r| data[r][feature] < threshold);
    if left_rows.is_empty() || right_rows.is_empty() {
        return IsoNode::Leaf { size: rows.len() };
    }

    IsoNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, &left_rows, rng, depth + 1, limit)),
        right: Box::new(build_tree(data, &right_rows, rng, depth + 1, limit)),
    }
}

fn feature_range(data: &[Vec<f64>], rows: &[usize], feature: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &r in rows {
        let x = data[r][feature];
        min = min.min(x);
        max = max.max(x);
    }
    (min, max)
}

fn path_length(node: &IsoNode, row: &[f64], depth: usize) -> f64 {
    match node {
        IsoNode::Leaf { size } => depth as f64 + average_path_length(*size),
        IsoNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points,
/// the standard isolation-forest normalization term.
fn average_path_length(n: usize) -> f64 {
    const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;
    if n <= 1 {
        return 0.0;
    }
    let h = ((n - 1) as f64).ln() + EULER_MASCHERONI;
    2.0 * h - 2.0 * (n - 1) as f64 / n as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, DataType, Value};

    fn table_of(values: &[f64]) -> Table {
        Table::from_columns(vec![Column::new(
            "x",
            DataType::Float,
            values.iter().map(|v| Value::Float(*v)).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn test_iqr_matches_reference_scenario() {
        // [1,2,3,4,5,100], multiplier 1.5 -> bounds [-1.5, 8.5], 100 removed
        let table = table_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let out = iqr_remove(&table, &[0], 1.5).table;
        assert_eq!(out.row_count(), 5);
        assert!(
            out.columns()[0]
                .values
                .iter()
                .all(|v| v.as_f64().unwrap() <= 5.0)
        );
    }

    #[test]
    fn test_iqr_keeps_rows_with_missing_target() {
        let table = Table::from_columns(vec![Column::new(
            "x",
            DataType::Float,
            vec![Value::Float(1.0), Value::Null, Value::Float(1000.0), Value::Float(2.0), Value::Float(1.5)],
        )])
        .unwrap();
        let out = iqr_remove(&table, &[0], 1.5).table;
        assert!(out.columns()[0].values.contains(&Value::Null));
    }

    #[test]
    fn test_zscore_removes_extreme_point() {
        let mut values: Vec<f64> = vec![10.0; 20];
        values.push(1000.0);
        let table = table_of(&values);
        let out = zscore_remove(&table, &[0], 3.0).table;
        assert_eq!(out.row_count(), 20);
    }

    #[test]
    fn test_zscore_zero_stddev_removes_nothing() {
        let table = table_of(&[5.0, 5.0, 5.0, 5.0]);
        let out = zscore_remove(&table, &[0], 0.5).table;
        assert_eq!(out.row_count(), 4);
    }

    #[test]
    fn test_isolation_forest_is_deterministic() {
        let mut values: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        values.push(500.0);
        let table = table_of(&values);

        let first = isolation_forest_remove(&table, &[0], 0.1).table;
        let second = isolation_forest_remove(&table, &[0], 0.1).table;
        assert_eq!(first, second);
        assert!(first.row_count() < table.row_count());
    }

    #[test]
    fn test_isolation_forest_flags_planted_outlier() {
        let mut values: Vec<f64> = (0..50).map(|i| 10.0 + (i % 5) as f64).collect();
        values.push(9999.0);
        let table = table_of(&values);

        // contamination 0.02 over 51 rows -> exactly 1 removal
        let out = isolation_forest_remove(&table, &[0], 0.02).table;
        assert_eq!(out.row_count(), 50);
        assert!(!out.columns()[0].values.contains(&Value::Float(9999.0)));
    }

    #[test]
    fn test_isolation_forest_tiny_contamination_is_noop() {
        let table = table_of(&[1.0, 2.0, 3.0]);
        let out = isolation_forest_remove(&table, &[0], 0.1).table;
        // floor(0.1 * 3) = 0 rows to remove
        assert_eq!(out.row_count(), 3);
    }
}
