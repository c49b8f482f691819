use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod dispatcher;
pub mod format;
pub mod staging;

// Re-export for convenience
pub use backend::{BackendError, ExtractionBackend};
pub use config_file::{ConfigFile, Settings};
pub use dispatcher::{Dispatcher, DispatcherBuilder, MissingBackend};
pub use format::FormatTag;
pub use staging::{StagedResource, Stager, StagingError, TempFileStager};

/// Hard ceiling on an uploaded payload: 10 MiB. Equal is allowed, over is rejected.
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Returned in place of text when a strategy yields nothing but whitespace.
pub const NO_TEXT_SENTINEL: &str = "No readable text found.";

/// A named byte payload received from a caller.
///
/// Lives for exactly one request and is never written anywhere except the
/// transient staged copy the dispatcher hands to a strategy.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadPayload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Normalized output of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub file_name: String,
    pub file_type: FormatTag,
    /// Never empty: blank extractions are replaced by [`NO_TEXT_SENTINEL`].
    pub extracted_text: String,
}

/// The three extraction procedures a [`FormatTag`] can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Pdf,
    Document,
    Image,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Pdf => "pdf",
            Strategy::Document => "document",
            Strategy::Image => "image",
        }
    }

    /// Tag a backend failure with the strategy that produced it.
    pub fn failure(self, err: BackendError) -> ExtractError {
        match self {
            Strategy::Pdf => ExtractError::PdfExtractionFailed(err),
            Strategy::Document => ExtractError::DocExtractionFailed(err),
            Strategy::Image => ExtractError::OcrExtractionFailed(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },
    #[error("File too large. Max size is {}.", size_label(&.limit))]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("PDF extraction failed: {0}")]
    PdfExtractionFailed(#[source] BackendError),
    #[error("DOCX extraction failed: {0}")]
    DocExtractionFailed(#[source] BackendError),
    #[error("OCR extraction failed: {0}")]
    OcrExtractionFailed(#[source] BackendError),
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),
}

impl ExtractError {
    /// True when the caller can fix the failure by changing the upload.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExtractError::Staging(_))
    }

    /// The strategy that failed, if this is a strategy failure.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            ExtractError::PdfExtractionFailed(_) => Some(Strategy::Pdf),
            ExtractError::DocExtractionFailed(_) => Some(Strategy::Document),
            ExtractError::OcrExtractionFailed(_) => Some(Strategy::Image),
            _ => None,
        }
    }
}

/// Whole mebibytes print as `N MB`; anything else prints in bytes.
fn size_label(bytes: &usize) -> String {
    const MIB: usize = 1024 * 1024;
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Replace blank strategy output with [`NO_TEXT_SENTINEL`].
pub fn normalize_text(text: String) -> String {
    if text.trim().is_empty() {
        NO_TEXT_SENTINEL.to_string()
    } else {
        text
    }
}
