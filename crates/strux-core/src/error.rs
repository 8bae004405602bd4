//! Error types for the strux-core library.

use thiserror::Error;

/// Main error type for the strux library.
///
/// Only failures that end a request early live here. Oracle failures that
/// can be retried and every validation failure are data inside the
/// extraction loop's state, not errors.
#[derive(Error, Debug)]
pub enum StruxError {
    /// Input could not be turned into text.
    #[error("ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Oracle failure that cannot be retried.
    #[error("oracle error: {0}")]
    Oracle(#[from] strux_oracle::OracleError),

    /// Schema descriptor or candidate (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading input documents.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file could not be read as any supported format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to open/parse a PDF.
    #[error("failed to read PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Failed to open/parse a word-processor document.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// The file exceeds the configured size limit.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// No text could be extracted.
    #[error("no text found in {0}")]
    Empty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the strux library.
pub type Result<T> = std::result::Result<T, StruxError>;
