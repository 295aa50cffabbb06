// tabula-core/src/domain/lineage.rs
//
// Structured record of what a transform did to a table. These records are
// the only thing the version-store boundary ever sees: serializable, flat,
// no live table data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::dataset::Table;
use crate::domain::ops::OperationSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

impl TableShape {
    pub fn of(table: &Table) -> Self {
        Self {
            rows: table.row_count(),
            columns: table.column_count(),
        }
    }
}

/// Recorded when a freshly created column had to be renamed to dodge a
/// collision with an existing name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub requested: String,
    pub actual: String,
}

/// Immutable outcome of one executed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub table_before_shape: TableShape,
    pub table_after_shape: TableShape,
    pub columns_added: BTreeSet<String>,
    pub columns_removed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns_renamed: Vec<ColumnRename>,
    pub rows_removed: usize,
    pub operation: OperationSpec,
    pub timestamp: DateTime<Utc>,
}

impl StepResult {
    /// Derive the lineage record from the literal before/after tables, so
    /// the column accounting can never drift from what actually happened.
    pub fn diff(
        before: &Table,
        after: &Table,
        operation: OperationSpec,
        columns_renamed: Vec<ColumnRename>,
    ) -> Self {
        let before_names: BTreeSet<String> = before.column_names().map(String::from).collect();
        let after_names: BTreeSet<String> = after.column_names().map(String::from).collect();

        Self {
            table_before_shape: TableShape::of(before),
            table_after_shape: TableShape::of(after),
            columns_added: after_names.difference(&before_names).cloned().collect(),
            columns_removed: before_names.difference(&after_names).cloned().collect(),
            columns_renamed,
            rows_removed: before.row_count().saturating_sub(after.row_count()),
            operation,
            timestamp: Utc::now(),
        }
    }
}

/// Serializable envelope handed to the version store: one document per
/// applied step, ordered by `version_number` within a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub dataset_id: String,
    pub version_number: usize,
    pub operation_type: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub columns_added: BTreeSet<String>,
    pub columns_removed: BTreeSet<String>,
    pub operation: OperationSpec,
    pub created_at: DateTime<Utc>,
}

impl VersionRecord {
    pub fn from_step(dataset_id: &str, version_number: usize, step: &StepResult) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            version_number,
            operation_type: step.operation.kind.to_string(),
            rows_before: step.table_before_shape.rows,
            rows_after: step.table_after_shape.rows,
            columns_before: step.table_before_shape.columns,
            columns_after: step.table_after_shape.columns,
            columns_added: step.columns_added.clone(),
            columns_removed: step.columns_removed.clone(),
            operation: step.operation.clone(),
            created_at: step.timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, DataType, Value};
    use crate::domain::ops::OperationKind;

    fn table(names: &[&str], rows: usize) -> Table {
        Table::from_columns(
            names
                .iter()
                .map(|n| Column::new(*n, DataType::Integer, vec![Value::Int(1); rows]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_diff_accounts_for_added_and_removed_columns() {
        let before = table(&["a", "b"], 4);
        let after = table(&["a", "c", "d"], 3);

        let result = StepResult::diff(
            &before,
            &after,
            OperationSpec::new(OperationKind::OnehotEncode),
            vec![],
        );

        assert_eq!(result.rows_removed, 1);
        assert_eq!(
            result.columns_added,
            ["c", "d"].iter().map(|s| s.to_string()).collect()
        );
        assert_eq!(
            result.columns_removed,
            ["b"].iter().map(|s| s.to_string()).collect()
        );
        assert_eq!(result.table_before_shape, TableShape { rows: 4, columns: 2 });
        assert_eq!(result.table_after_shape, TableShape { rows: 3, columns: 3 });
    }

    #[test]
    fn test_version_record_serializes_as_flat_json() {
        let before = table(&["a"], 2);
        let after = table(&["a"], 1);
        let step = StepResult::diff(
            &before,
            &after,
            OperationSpec::new(OperationKind::DropDuplicates),
            vec![],
        );

        let record = VersionRecord::from_step("customers", 1, &step);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dataset_id"], "customers");
        assert_eq!(json["operation_type"], "drop_duplicates");
        assert_eq!(json["rows_before"], 2);
        assert_eq!(json["rows_after"], 1);
    }
}
