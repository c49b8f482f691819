//! DOCX text extraction.
//!
//! The container is parsed with `docx-rs`. Only paragraphs that are direct
//! children of the document body are emitted, each followed by `\n`.
//! Paragraphs inside tables, content controls and text boxes are skipped.

use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use doctext_core::{BackendError, ExtractionBackend};

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxBackend;

impl DocxBackend {
    pub fn new() -> Self {
        Self
    }

    /// Read the top-level paragraphs of a DOCX container, in document order.
    pub fn paragraphs(data: &[u8]) -> Result<Vec<String>, BackendError> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| BackendError::OpenError(format!("not a readable DOCX document: {}", e)))?;

        Ok(docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            })
            .collect())
    }
}

impl ExtractionBackend for DocxBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let data = std::fs::read(path).map_err(|e| BackendError::OpenError(e.to_string()))?;
        let paragraphs = Self::paragraphs(&data)?;

        let mut text = String::new();
        for para in &paragraphs {
            text.push_str(para);
            text.push('\n');
        }

        tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "docx text extracted");
        Ok(text)
    }
}

/// Text of one paragraph: run text verbatim, tabs as `\t`, breaks as `\n`.
/// Hyperlink runs count; deleted text does not.
pub fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for part in &run.children {
                    match part {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}
