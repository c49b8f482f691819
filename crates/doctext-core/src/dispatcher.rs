//! Extraction dispatch: classify → size check → stage → extract → release → normalize.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    ExtractError, ExtractionBackend, ExtractionResult, FormatTag, MAX_PAYLOAD_BYTES, Stager,
    Strategy, TempFileStager, UploadPayload, normalize_text,
};

/// Routes each payload to the backend for its format.
///
/// Holds no per-request state, so one instance can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Dispatcher {
    pdf: Arc<dyn ExtractionBackend>,
    document: Arc<dyn ExtractionBackend>,
    image: Arc<dyn ExtractionBackend>,
    stager: Arc<dyn Stager>,
    max_payload_bytes: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("max_payload_bytes", &self.max_payload_bytes)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    fn backend(&self, strategy: Strategy) -> &dyn ExtractionBackend {
        match strategy {
            Strategy::Pdf => self.pdf.as_ref(),
            Strategy::Document => self.document.as_ref(),
            Strategy::Image => self.image.as_ref(),
        }
    }

    /// Extract text from an uploaded payload.
    ///
    /// Format and size are checked before anything touches the disk. Once a
    /// resource is staged it is released on every exit path; a release fault
    /// never hides a strategy failure that already happened.
    pub fn extract(&self, payload: &UploadPayload) -> Result<ExtractionResult, ExtractError> {
        let file_type = FormatTag::from_file_name(&payload.file_name)?;

        if payload.len() > self.max_payload_bytes {
            return Err(ExtractError::PayloadTooLarge {
                size: payload.len(),
                limit: self.max_payload_bytes,
            });
        }

        let strategy = file_type.strategy();
        let staged = self.stager.stage(&payload.file_name, &payload.data)?;

        tracing::debug!(
            file_name = %payload.file_name,
            file_type = %file_type,
            strategy = strategy.name(),
            bytes = payload.len(),
            "dispatching extraction"
        );

        let outcome = self.backend(strategy).extract_text(staged.path());
        let released = staged.release();

        let text = match (outcome, released) {
            (Ok(text), Ok(())) => text,
            (Ok(_), Err(cleanup)) => return Err(cleanup.into()),
            (Err(e), Ok(())) => {
                tracing::warn!(file_name = %payload.file_name, strategy = strategy.name(), error = %e, "extraction failed");
                return Err(strategy.failure(e));
            }
            (Err(e), Err(cleanup)) => {
                tracing::warn!(file_name = %payload.file_name, error = %cleanup, "failed to release staged payload after extraction error");
                return Err(strategy.failure(e));
            }
        };

        Ok(ExtractionResult {
            file_name: payload.file_name.clone(),
            file_type,
            extracted_text: normalize_text(text),
        })
    }
}

#[derive(Error, Debug)]
#[error("no backend configured for {} extraction", .0.name())]
pub struct MissingBackend(pub Strategy);

/// Builder for [`Dispatcher`]. All three backends are required.
#[derive(Default)]
pub struct DispatcherBuilder {
    pdf: Option<Arc<dyn ExtractionBackend>>,
    document: Option<Arc<dyn ExtractionBackend>>,
    image: Option<Arc<dyn ExtractionBackend>>,
    stager: Option<Arc<dyn Stager>>,
    max_payload_bytes: Option<usize>,
}

impl DispatcherBuilder {
    pub fn pdf(mut self, backend: Arc<dyn ExtractionBackend>) -> Self {
        self.pdf = Some(backend);
        self
    }

    pub fn document(mut self, backend: Arc<dyn ExtractionBackend>) -> Self {
        self.document = Some(backend);
        self
    }

    pub fn image(mut self, backend: Arc<dyn ExtractionBackend>) -> Self {
        self.image = Some(backend);
        self
    }

    /// Defaults to a [`TempFileStager`] in the system temp directory.
    pub fn stager(mut self, stager: Arc<dyn Stager>) -> Self {
        self.stager = Some(stager);
        self
    }

    /// Defaults to [`MAX_PAYLOAD_BYTES`].
    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    pub fn build(self) -> Result<Dispatcher, MissingBackend> {
        Ok(Dispatcher {
            pdf: self.pdf.ok_or(MissingBackend(Strategy::Pdf))?,
            document: self.document.ok_or(MissingBackend(Strategy::Document))?,
            image: self.image.ok_or(MissingBackend(Strategy::Image))?,
            stager: self
                .stager
                .unwrap_or_else(|| Arc::new(TempFileStager::new())),
            max_payload_bytes: self.max_payload_bytes.unwrap_or(MAX_PAYLOAD_BYTES),
        })
    }
}
