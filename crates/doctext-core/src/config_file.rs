use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::MAX_PAYLOAD_BYTES;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub limits: Option<LimitsConfig>,
    pub ocr: Option<OcrConfigFile>,
    pub staging: Option<StagingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_upload_mb: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfigFile {
    pub tesseract_cmd: Option<String>,
    pub languages: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    pub dir: Option<String>,
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Fully resolved settings, every field concrete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub max_payload_bytes: usize,
    pub tesseract_cmd: PathBuf,
    pub ocr_languages: Option<String>,
    pub staging_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            tesseract_cmd: PathBuf::from(DEFAULT_TESSERACT_CMD),
            ocr_languages: None,
            staging_dir: None,
        }
    }
}

/// Platform config directory path: `<config_dir>/doctext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("doctext").join("config.toml"))
}

/// Load config by cascading CWD `.doctext.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".doctext.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            host: overlay
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.host.clone())),
            port: overlay
                .server
                .as_ref()
                .and_then(|s| s.port)
                .or_else(|| base.server.as_ref().and_then(|s| s.port)),
        }),
        limits: Some(LimitsConfig {
            max_upload_mb: overlay
                .limits
                .as_ref()
                .and_then(|l| l.max_upload_mb)
                .or_else(|| base.limits.as_ref().and_then(|l| l.max_upload_mb)),
        }),
        ocr: Some(OcrConfigFile {
            tesseract_cmd: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.tesseract_cmd.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.tesseract_cmd.clone())),
            languages: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.languages.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.languages.clone())),
        }),
        staging: Some(StagingConfig {
            dir: overlay
                .staging
                .as_ref()
                .and_then(|s| s.dir.clone())
                .or_else(|| base.staging.as_ref().and_then(|s| s.dir.clone())),
        }),
    }
}

impl ConfigFile {
    /// Overlay environment variables on this config.
    ///
    /// Reads `DOCTEXT_HOST`, `DOCTEXT_PORT`, `DOCTEXT_MAX_UPLOAD_MB`,
    /// `TESSERACT_CMD`, `TESSERACT_LANGS` and `DOCTEXT_STAGING_DIR`.
    /// Unparseable numbers are ignored.
    pub fn with_env(self) -> ConfigFile {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(self, var: impl Fn(&str) -> Option<String>) -> ConfigFile {
        let env = ConfigFile {
            server: Some(ServerConfig {
                host: var("DOCTEXT_HOST"),
                port: var("DOCTEXT_PORT").and_then(|v| v.parse().ok()),
            }),
            limits: Some(LimitsConfig {
                max_upload_mb: var("DOCTEXT_MAX_UPLOAD_MB").and_then(|v| v.parse().ok()),
            }),
            ocr: Some(OcrConfigFile {
                tesseract_cmd: var("TESSERACT_CMD"),
                languages: var("TESSERACT_LANGS"),
            }),
            staging: Some(StagingConfig {
                dir: var("DOCTEXT_STAGING_DIR"),
            }),
        };
        merge(self, env)
    }

    /// Fill every unset field with its default.
    pub fn resolve(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            host: self
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(defaults.host),
            port: self
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(defaults.port),
            max_payload_bytes: self
                .limits
                .as_ref()
                .and_then(|l| l.max_upload_mb)
                .filter(|&mb| {
                    if mb == 0 {
                        tracing::warn!("ignoring max_upload_mb = 0, using the default limit");
                    }
                    mb > 0
                })
                .map(|mb| mb as usize * 1024 * 1024)
                .unwrap_or(defaults.max_payload_bytes),
            tesseract_cmd: self
                .ocr
                .as_ref()
                .and_then(|o| o.tesseract_cmd.as_deref())
                .map(PathBuf::from)
                .unwrap_or(defaults.tesseract_cmd),
            ocr_languages: self
                .ocr
                .as_ref()
                .and_then(|o| o.languages.clone())
                .filter(|l| !l.trim().is_empty()),
            staging_dir: self
                .staging
                .as_ref()
                .and_then(|s| s.dir.as_deref())
                .map(PathBuf::from),
        }
    }
}
