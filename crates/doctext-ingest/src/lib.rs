use std::sync::Arc;

use doctext_core::{Dispatcher, MissingBackend, Settings, TempFileStager};
use doctext_docx::DocxBackend;
use doctext_ocr::{OcrConfig, TesseractBackend};
use doctext_pdf_mupdf::MupdfBackend;

// Re-export domain types for convenience
pub use doctext_core::{ExtractError, ExtractionResult, UploadPayload};

/// Build a dispatcher backed by MuPDF, docx-rs and tesseract.
///
/// Stages into `settings.staging_dir` when set, otherwise the system temp
/// directory.
pub fn dispatcher(settings: &Settings) -> Result<Dispatcher, MissingBackend> {
    let stager = match settings.staging_dir {
        Some(ref dir) => TempFileStager::in_dir(dir),
        None => TempFileStager::new(),
    };

    tracing::debug!(
        staging_dir = %stager.dir().display(),
        max_payload_bytes = settings.max_payload_bytes,
        tesseract = %settings.tesseract_cmd.display(),
        "wiring extraction backends"
    );

    Dispatcher::builder()
        .pdf(Arc::new(MupdfBackend::new()))
        .document(Arc::new(DocxBackend::new()))
        .image(Arc::new(TesseractBackend::new(OcrConfig::from(settings))))
        .stager(Arc::new(stager))
        .max_payload_bytes(settings.max_payload_bytes)
        .build()
}
