//! Transient on-disk copies of uploaded payloads.
//!
//! PDF, DOCX and OCR backends all want a file path rather than a buffer, so
//! the dispatcher writes each payload to a [`StagedResource`] first. Names are
//! unique per request (random component from `tempfile`), which is what lets
//! concurrent uploads of identically named files run without locking.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("failed to stage payload: {0}")]
    Stage(#[source] std::io::Error),
    #[error("failed to release staged payload: {0}")]
    Release(#[source] std::io::Error),
}

/// Capability to turn an in-memory payload into an addressable resource.
pub trait Stager: Send + Sync {
    /// Stage `data` under a name derived from `file_name` but unique to this call.
    fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedResource, StagingError>;
}

/// A staged payload on disk.
///
/// Removed by [`release`](Self::release), or by `Drop` if the owner returns
/// early or unwinds.
#[derive(Debug)]
pub struct StagedResource {
    path: TempPath,
}

impl StagedResource {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file, reporting any failure.
    pub fn release(self) -> Result<(), StagingError> {
        self.path.close().map_err(StagingError::Release)
    }
}

/// Default [`Stager`]: named temp files in a staging directory.
#[derive(Debug, Clone, Default)]
pub struct TempFileStager {
    dir: Option<PathBuf>,
}

impl TempFileStager {
    /// Stage into the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage into `dir` instead of the system temp directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Stager for TempFileStager {
    fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedResource, StagingError> {
        let (prefix, suffix) = staged_name_parts(file_name);
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(self.dir())
            .map_err(StagingError::Stage)?;

        file.write_all(data).map_err(StagingError::Stage)?;
        file.flush().map_err(StagingError::Stage)?;

        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), bytes = data.len(), "staged payload");
        Ok(StagedResource::new(path))
    }
}

const MAX_STEM_CHARS: usize = 40;

/// Build a `doctext-<stem>-` prefix and `.<ext>` suffix from an untrusted
/// filename. Only ASCII alphanumerics, `-` and `_` survive, so the result can
/// never escape the staging directory. The extension is kept because some
/// backends (MuPDF) pick a handler by it.
fn staged_name_parts(file_name: &str) -> (String, String) {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (base, ""),
    };

    let clean = |s: &str, limit: usize| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(limit)
            .collect()
    };

    let stem = clean(stem, MAX_STEM_CHARS);
    let ext = clean(ext, 8).to_lowercase();

    let prefix = if stem.is_empty() {
        "doctext-".to_string()
    } else {
        format!("doctext-{stem}-")
    };
    let suffix = if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    };
    (prefix, suffix)
}
