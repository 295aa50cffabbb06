// tabula-core/src/infrastructure/adapters/csv.rs
//
// CSV <-> Table boundary. Collaborators hand the core an already-parsed
// Table; this adapter is where that parsing happens for the CLI. Types are
// inferred per column: integer, then float, then boolean, then timestamp,
// falling back to text. An empty cell is a missing value.

use std::path::Path;

use tracing::{info, instrument};

use crate::domain::dataset::{Column, DataType, Table, Value, parse_timestamp};
use crate::infrastructure::error::InfrastructureError;

#[instrument(skip(path), fields(path = ?path.as_ref()))]
pub fn read_table(path: impl AsRef<Path>) -> Result<Table, InfrastructureError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, field) in record.iter().enumerate() {
            if i < cells.len() {
                cells[i].push(field.to_string());
            }
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();

    let table = Table::from_columns(columns)
        .map_err(|e| InfrastructureError::ConfigError(format!("invalid CSV structure: {}", e)))?;
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "CSV loaded"
    );
    Ok(table)
}

/// Serialize a table back to CSV bytes (the caller decides where they land,
/// typically through `fs::atomic_write`).
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>, InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        writer.write_record(table.columns().iter().map(|c| c.values[row].render()))?;
    }
    writer
        .into_inner()
        .map_err(|e| InfrastructureError::ConfigError(format!("CSV flush failed: {}", e)))
}

fn infer_column(name: String, raw: Vec<String>) -> Column {
    let dtype = infer_dtype(&raw);
    let values = raw.iter().map(|cell| parse_cell(cell, dtype)).collect();
    Column::new(name, dtype, values)
}

fn infer_dtype(raw: &[String]) -> DataType {
    let present: Vec<&str> = raw
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if present.is_empty() {
        return DataType::Text;
    }
    if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return DataType::Integer;
    }
    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return DataType::Float;
    }
    if present.iter().all(|s| parse_bool(s).is_some()) {
        return DataType::Boolean;
    }
    if present.iter().all(|s| parse_timestamp(s).is_some()) {
        return DataType::Timestamp;
    }
    DataType::Text
}

fn parse_cell(cell: &str, dtype: DataType) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match dtype {
        DataType::Integer => cell.parse::<i64>().map_or(Value::Null, Value::Int),
        DataType::Float => cell.parse::<f64>().map_or(Value::Null, Value::Float),
        DataType::Boolean => parse_bool(cell).map_or(Value::Null, Value::Bool),
        DataType::Timestamp => parse_timestamp(cell).map_or(Value::Null, Value::Timestamp),
        DataType::Text => Value::Text(cell.to_string()),
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
