//! Error types for rowtable
//!
//! Provides a unified error type for all table operations.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for rowtable operations
#[derive(Debug, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Table is shut down")]
    Closed,

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Row id {row_id} at index {index} is out of order (follows {previous})")]
    OutOfOrder {
        index: usize,
        previous: i64,
        row_id: i64,
    },

    #[error("Duplicate row id {row_id} at index {index}")]
    DuplicateRowId { index: usize, row_id: i64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TableError {
    /// True for errors raised by the order check rather than by I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TableError::OutOfOrder { .. } | TableError::DuplicateRowId { .. }
        )
    }
}
