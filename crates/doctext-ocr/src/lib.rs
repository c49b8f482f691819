//! Image OCR backend driving the `tesseract` command-line engine.
//!
//! The staged file is decoded first so corrupt or non-image uploads fail
//! without starting the engine. The engine then reads the same file and
//! writes recognized text to stdout. No preprocessing is applied.

use std::path::{Path, PathBuf};
use std::process::Command;

use doctext_core::{BackendError, ExtractionBackend, Settings};

/// Engine location and options, injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Path to (or bare name of) the tesseract binary.
    pub tesseract_cmd: PathBuf,
    /// Tesseract languages such as `eng` or `deu+eng`. `None` uses the
    /// engine's default.
    pub languages: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            languages: None,
        }
    }
}

impl From<&Settings> for OcrConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            tesseract_cmd: settings.tesseract_cmd.clone(),
            languages: settings.ocr_languages.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.tesseract_cmd);
        cmd.arg(path).arg("stdout");
        if let Some(ref langs) = self.config.languages {
            cmd.arg("-l").arg(langs);
        }
        cmd
    }
}

/// Decode the image to check that it is a readable raster.
fn probe_image(path: &Path) -> Result<(u32, u32), BackendError> {
    let bytes = std::fs::read(path).map_err(|e| BackendError::OpenError(e.to_string()))?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| BackendError::OpenError(format!("cannot identify image file: {}", e)))?;
    Ok((img.width(), img.height()))
}

impl ExtractionBackend for TesseractBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let (width, height) = probe_image(path)?;

        let output = self.command(path).output().map_err(|e| {
            BackendError::Engine(format!(
                "failed to run {}: {}",
                self.config.tesseract_cmd.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Engine(format!(
                "{} exited with {}: {}",
                self.config.tesseract_cmd.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| BackendError::Engine(format!("engine produced non-UTF-8 output: {}", e)))?;

        tracing::debug!(path = %path.display(), width, height, chars = text.len(), "ocr text extracted");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_includes_languages_when_set() {
        let backend = TesseractBackend::new(OcrConfig {
            tesseract_cmd: PathBuf::from("/opt/ocr/tesseract"),
            languages: Some("deu+eng".into()),
        });
        let cmd = backend.command(Path::new("/tmp/scan.png"));
        assert_eq!(cmd.get_program(), "/opt/ocr/tesseract");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["/tmp/scan.png", "stdout", "-l", "deu+eng"]);
    }

    #[test]
    fn command_omits_languages_by_default() {
        let backend = TesseractBackend::default();
        let cmd = backend.command(Path::new("scan.jpg"));
        assert_eq!(cmd.get_program(), "tesseract");
        assert_eq!(cmd.get_args().count(), 2);
    }

    #[test]
    fn config_follows_settings() {
        let settings = Settings {
            tesseract_cmd: PathBuf::from("C:/Tesseract-OCR/tesseract.exe"),
            ocr_languages: Some("eng".into()),
            ..Settings::default()
        };
        let config = OcrConfig::from(&settings);
        assert_eq!(
            config.tesseract_cmd,
            PathBuf::from("C:/Tesseract-OCR/tesseract.exe")
        );
        assert_eq!(config.languages.as_deref(), Some("eng"));
    }
}
