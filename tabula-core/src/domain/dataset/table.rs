// tabula-core/src/domain/dataset/table.rs

use serde::{Deserialize, Serialize};

use crate::domain::dataset::value::{DataType, Value, ValueKey};
use crate::domain::error::DomainError;

/// A named, typed sequence of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing cells as f64, in row order. Only meaningful on numeric
    /// columns; non-numeric cells are silently skipped.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

/// An ordered collection of columns.
///
/// Invariants (enforced on every construction and insertion):
/// - column names are unique,
/// - all columns hold the same number of rows.
///
/// Tables are value types. Transforms never mutate their input; they build
/// a new `Table` and hand it back, so a rejected operation cannot leave the
/// caller holding a half-modified dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DomainError> {
        let mut table = Self::empty();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), DomainError> {
        if self.contains_column(&column.name) {
            return Err(DomainError::InvalidTable(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(DomainError::InvalidTable(format!(
                "column '{}' holds {} values but the table has {} rows",
                column.name,
                column.len(),
                self.row_count()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.column_index(name)?;
        Some(self.columns.remove(idx))
    }

    pub(crate) fn column_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }

    /// Keep only the rows flagged `true`, preserving relative order.
    /// `keep` must be row_count() long.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.row_count(), "keep mask length mismatch");
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Identity of one row, restricted to the given column indexes.
    pub fn row_key(&self, row: usize, column_indexes: &[usize]) -> Vec<ValueKey> {
        column_indexes
            .iter()
            .map(|&c| self.columns[c].values[row].key())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn int_column(name: &str, values: &[i64]) -> Column {
        Column::new(
            name,
            DataType::Integer,
            values.iter().map(|v| Value::Int(*v)).collect(),
        )
    }

    #[test]
    fn test_from_columns_accepts_consistent_table() {
        let table =
            Table::from_columns(vec![int_column("a", &[1, 2]), int_column("b", &[3, 4])]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_duplicate_column_name_rejected() {
        let result = Table::from_columns(vec![int_column("a", &[1]), int_column("a", &[2])]);
        assert!(matches!(result, Err(DomainError::InvalidTable(_))));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::from_columns(vec![int_column("a", &[1, 2]), int_column("b", &[3])]);
        assert!(matches!(result, Err(DomainError::InvalidTable(_))));
    }

    #[test]
    fn test_retain_rows_preserves_order() {
        let mut table = Table::from_columns(vec![int_column("a", &[10, 20, 30, 40])]).unwrap();
        table.retain_rows(&[true, false, true, true]);
        assert_eq!(
            table.columns()[0].values,
            vec![Value::Int(10), Value::Int(30), Value::Int(40)]
        );
    }

    #[test]
    fn test_remove_column() {
        let mut table =
            Table::from_columns(vec![int_column("a", &[1]), int_column("b", &[2])]).unwrap();
        assert!(table.remove_column("a").is_some());
        assert!(table.remove_column("a").is_none());
        assert_eq!(table.column_count(), 1);
    }
}
