// tabula-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Unknown operation: '{0}'")]
    #[diagnostic(
        code(tabula::domain::unknown_operation),
        help("Run 'tabula ops' to list the supported operation kinds.")
    )]
    UnknownOperation(String),

    #[error("Invalid parameters for '{operation}': {reason}")]
    #[diagnostic(code(tabula::domain::invalid_parameters))]
    InvalidParameters { operation: String, reason: String },

    #[error("Type mismatch on column '{column}': expected {expected}, found {actual}")]
    #[diagnostic(
        code(tabula::domain::type_mismatch),
        help("Numeric-only operations refuse non-numeric targets instead of silently coercing.")
    )]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Column '{0}' not found in table")]
    #[diagnostic(code(tabula::domain::column_not_found))]
    ColumnNotFound(String),

    #[error("Insufficient data in column '{column}': {reason}")]
    #[diagnostic(code(tabula::domain::insufficient_data))]
    InsufficientData { column: String, reason: String },

    #[error(
        "Cardinality too high on column '{column}': {cardinality} distinct values (ceiling: {ceiling})"
    )]
    #[diagnostic(
        code(tabula::domain::cardinality),
        help("Raise 'transforms.cardinality_ceiling' in the project config, or reduce the category count first.")
    )]
    CardinalityTooHigh {
        column: String,
        cardinality: usize,
        ceiling: usize,
    },

    #[error("Execution failed for '{operation}': {reason}")]
    #[diagnostic(code(tabula::domain::execution))]
    ExecutionError { operation: String, reason: String },

    #[error("Invalid table: {0}")]
    #[diagnostic(code(tabula::domain::table))]
    InvalidTable(String),

    #[error("Step index {index} out of range: pipeline has {len} steps")]
    #[diagnostic(code(tabula::domain::step_range))]
    StepOutOfRange { index: usize, len: usize },

    #[error("Query rejected: {0}")]
    #[diagnostic(
        code(tabula::domain::query),
        help("Only a single SELECT statement may run against a dataset.")
    )]
    QueryRejected(String),
}
