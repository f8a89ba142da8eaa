//! Error types for lease valuation

use thiserror::Error;

/// Errors raised while building or valuing a lease
#[derive(Debug, Error)]
pub enum LeaseError {
    /// A per-year escalator schedule does not cover the lease term exactly
    #[error("Length of custom escalators ({schedule_len}) must equal term_years ({term_years})")]
    EscalatorLengthMismatch { term_years: u32, schedule_len: usize },

    /// A lease record carries a field that cannot be valued
    #[error("Invalid lease record '{name}': {field} {reason}")]
    InvalidRecord {
        name: String,
        field: &'static str,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LeaseError>;
