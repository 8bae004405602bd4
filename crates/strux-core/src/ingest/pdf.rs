//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::Result;
use crate::error::IngestError;

/// Extract the text of every page, joined with newlines.
///
/// Pages are read with lopdf first. If that yields nothing (unusual font
/// encodings), the whole document is handed to pdf-extract instead.
/// Documents protected only by an empty user password are decrypted.
pub fn read_pdf(data: &[u8]) -> Result<String> {
    let mut doc = Document::load_mem(data).map_err(|e| IngestError::Pdf(e.to_string()))?;

    let raw_data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(IngestError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| IngestError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(IngestError::Pdf("document has no pages".to_string()));
    }

    let mut page_texts = Vec::with_capacity(pages.len());
    for page in &pages {
        match doc.extract_text(&[*page]) {
            Ok(text) => {
                trace!("Page {}: {} chars", page, text.len());
                page_texts.push(text.trim().to_string());
            }
            Err(e) => {
                warn!("Page {}: text extraction failed: {}", page, e);
                page_texts.push(String::new());
            }
        }
    }

    let mut text = page_texts.join("\n").trim().to_string();

    if text.is_empty() {
        debug!("lopdf found no text, falling back to pdf-extract");
        text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| IngestError::Pdf(e.to_string()))?
            .trim()
            .to_string();
    }

    if text.is_empty() {
        return Err(IngestError::Empty("PDF (scanned documents are not supported)".to_string()));
    }

    debug!("Extracted {} chars from {} page(s)", text.len(), pages.len());
    Ok(text)
}
