use std::path::Path;

use mupdf::{Document, TextPageFlags};

use doctext_core::{BackendError, ExtractionBackend};

/// MuPDF-based PDF strategy.
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so that the DOCX and
/// OCR code paths do not transitively depend on it.
///
/// Pages are visited in document order and their text is concatenated with
/// no separator. A page without text contributes nothing; a page that fails
/// to load or render to text fails the whole document, so callers never see
/// partial output.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn page_text(page: &mupdf::Page) -> Result<String, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

impl ExtractionBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut text = String::new();
        let mut page_count = 0usize;

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| {
                BackendError::ExtractionError(format!("page {}: {}", page_count + 1, e))
            })?;
            text.push_str(&Self::page_text(&page)?);
            page_count += 1;
        }

        tracing::debug!(path = %path.display(), page_count, chars = text.len(), "pdf text extracted");
        Ok(text)
    }
}
