//! Core library for schema-driven structured extraction.
//!
//! This crate provides:
//! - Schema models (project invoices, meeting notes) and configuration
//! - Cross-field validation (dates, line-item arithmetic, tax and totals, vendor fields)
//! - The feedback prompt builder
//! - The extract-validate-repair loop over an oracle backend
//! - Input ingestion (plain text, PDF, DOCX)

pub mod error;
pub mod extraction;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod validate;

pub use error::{IngestError, Result, StruxError};
pub use extraction::{
    AttemptRecord, Extractable, ExtractionLoop, ExtractionMetrics, LoopSettings, LoopState,
    Termination,
};
pub use models::config::StruxConfig;
pub use models::invoice::{Category, LineItem, ProjectInvoice, VendorInfo};
pub use models::notes::MeetingNotes;
pub use validate::{Validate, ValidationErrors};

/// Re-export oracle types.
pub use strux_oracle::{OracleBackend, OracleError, OracleRequest};
