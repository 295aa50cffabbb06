// tabula-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabulaError {
    // --- DOMAIN ERRORS (validation, transform semantics) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- STEP ATTRIBUTION (pipeline knows which operation failed) ---
    #[error("Step {index} failed: {source}")]
    Step { index: usize, source: DomainError },

    // --- INFRASTRUCTURE ERRORS (IO, parsing, database) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATIVE ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

// Manual implementation to avoid a duplicate enum variant but keep ergonomics
impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        TabulaError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl TabulaError {
    /// Index of the operation that failed, when the error came out of a
    /// pipeline step.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            TabulaError::Step { index, .. } => Some(*index),
            _ => None,
        }
    }
}
