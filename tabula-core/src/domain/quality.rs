// tabula-core/src/domain/quality.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::dataset::Table;

/// Fixed composite weights. These are a design choice of the scoring model,
/// not a user-facing knob.
pub const COMPLETENESS_WEIGHT: f64 = 0.6;
pub const UNIQUENESS_WEIGHT: f64 = 0.4;

/// Read-only snapshot metric; recomputed on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub completeness_score: f64,
    pub uniqueness_score: f64,
    pub composite_score: f64,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub total_cells: usize,
    pub computed_at: DateTime<Utc>,
}

pub struct QualityScorer;

impl QualityScorer {
    /// Deterministic pure function of the table snapshot.
    ///
    /// completeness = 1 - missing cells / total cells
    /// uniqueness   = distinct rows / total rows
    /// composite    = 0.6 * completeness + 0.4 * uniqueness
    ///
    /// An empty table (no rows or no columns) scores a perfect 1.0: there is
    /// nothing missing and nothing duplicated.
    pub fn score(table: &Table) -> QualityReport {
        let rows = table.row_count();
        let total_cells = rows * table.column_count();
        let missing_cells: usize = table.columns().iter().map(|c| c.missing_count()).sum();

        let all_columns: Vec<usize> = (0..table.column_count()).collect();
        let distinct_rows = (0..rows)
            .map(|r| table.row_key(r, &all_columns))
            .collect::<HashSet<_>>()
            .len();
        let duplicate_rows = rows - distinct_rows;

        let completeness_score = if total_cells == 0 {
            1.0
        } else {
            1.0 - missing_cells as f64 / total_cells as f64
        };
        let uniqueness_score = if rows == 0 {
            1.0
        } else {
            distinct_rows as f64 / rows as f64
        };

        QualityReport {
            completeness_score,
            uniqueness_score,
            composite_score: COMPLETENESS_WEIGHT * completeness_score
                + UNIQUENESS_WEIGHT * uniqueness_score,
            missing_cells,
            duplicate_rows,
            total_cells,
            computed_at: Utc::now(),
        }
    }
}
