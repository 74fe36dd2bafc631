//! Error types for the Ezme import and SEO pipeline.
//!
//! - [`CsvError`] - byte decoding and CSV reading errors
//! - [`ImportError`] - product import preconditions
//! - [`RepositoryError`] - product repository / storage errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while turning raw bytes into CSV rows.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Bytes could not be decoded with the detected encoding.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Failed to write CSV output.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),

    /// Empty file.
    #[error("CSV dosyası boş")]
    EmptyFile,
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors that abort a whole product import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The mandatory handle column is absent from the header row.
    #[error("CSV'de 'Handle' sütunu bulunamadı")]
    MissingHandleColumn,

    /// CSV reading error.
    #[error("{0}")]
    Csv(#[from] CsvError),

    /// Persisting the imported products failed.
    #[error("Kayıt hatası: {0}")]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Repository Errors
// =============================================================================

/// Errors from the product repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Product not found.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// A product with the same id already exists.
    #[error("Product already exists: {0}")]
    Duplicate(String),

    /// Underlying storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error.
    #[error("Storage IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Storage JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
