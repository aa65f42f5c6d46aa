// src/utils/error.rs
use thiserror::Error;

// Structural problems with the export itself. These abort the whole run.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Export is missing the expected root marker: {0}")]
    MissingRootMarker(String),

    #[error("No transaction containers found: {0}")]
    NotFound(String),

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid transaction row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
