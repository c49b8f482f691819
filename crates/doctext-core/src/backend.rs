use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open input: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("engine error: {0}")]
    Engine(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for text extraction backends.
///
/// Implementors read a staged file and return its text. They are stateless
/// per call and blocking; the [`Dispatcher`](crate::Dispatcher) owns staging,
/// cleanup and empty-text normalization, so a backend should return exactly
/// what it extracted, blank or not.
pub trait ExtractionBackend: Send + Sync {
    /// Extract the full text content of the file at `path`.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
