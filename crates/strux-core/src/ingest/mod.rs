//! Input ingestion: turn a file path or raw string into plain text.

mod docx;
mod pdf;

pub use docx::read_docx;
pub use pdf::read_pdf;

use std::path::Path;

use tracing::{debug, info};

use crate::error::IngestError;
use crate::models::config::IngestConfig;

/// Result type for ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Reader selected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Pdf,
    Docx,
    /// Unknown extension; read as UTF-8 text if possible.
    Unknown,
}

impl SourceKind {
    /// Pick a reader from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") | Some("text") | Some("md") => SourceKind::Text,
            Some("pdf") => SourceKind::Pdf,
            Some("docx") | Some("doc") => SourceKind::Docx,
            _ => SourceKind::Unknown,
        }
    }
}

/// Resolve an input that is either a path to an existing file or raw text.
pub fn load_input(input: &str, config: &IngestConfig) -> Result<String> {
    let path = Path::new(input);
    if path.is_file() {
        load_file(path, config)
    } else {
        debug!("Input is not a file, using it as raw text ({} chars)", input.chars().count());
        Ok(input.to_string())
    }
}

/// Read a file with the reader matching its extension.
pub fn load_file(path: &Path, config: &IngestConfig) -> Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size > config.max_file_bytes {
        return Err(IngestError::TooLarge {
            size,
            limit: config.max_file_bytes,
        });
    }

    let kind = SourceKind::from_path(path);
    info!("Reading {} as {:?} ({} bytes)", path.display(), kind, size);

    let data = std::fs::read(path)?;
    match kind {
        SourceKind::Text => read_text(&data),
        SourceKind::Pdf => read_pdf(&data),
        SourceKind::Docx => read_docx(&data),
        SourceKind::Unknown => read_text(&data)
            .map_err(|_| IngestError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Decode plain text as UTF-8.
pub fn read_text(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| IngestError::UnsupportedFormat(format!("not valid UTF-8 text: {}", e)))
}
