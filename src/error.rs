//! Error types for the effects engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// An event record lacks a required field. Fatal for the run: skipping
    /// the event instead would leave the account balances inconsistent.
    #[error("Event is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A numeric field could not be parsed as a decimal
    #[error("Invalid number in field '{field}': {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: effects-engine <events.csv>")]
    MissingArgument,
}
