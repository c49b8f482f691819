use doctext_core::{Dispatcher, MissingBackend, Settings};

use crate::MULTIPART_OVERHEAD_BYTES;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Wire the production backends from resolved settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, MissingBackend> {
        Ok(Self::new(doctext_ingest::dispatcher(settings)?))
    }

    /// Largest request body the transport will read.
    pub fn body_limit(&self) -> usize {
        self.dispatcher
            .max_payload_bytes()
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}
