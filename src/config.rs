//! File Export configuration management
//!
//! Configuration is resolved once at process start: built-in defaults, then an
//! optional TOML file, then environment overrides. The resulting value is
//! handed to every component by reference and never re-read.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the export root directory
pub const ENV_EXPORT_DIR: &str = "FILE_EXPORT_DIR";
/// Environment variable overriding the public base URL
pub const ENV_BASE_URL: &str = "FILE_EXPORT_BASE_URL";
/// Environment variable overriding the default persistence flag
pub const ENV_PERSISTENT: &str = "PERSISTENT_FILES";
/// Environment variable overriding the retention delay in minutes
pub const ENV_DELAY_MINUTES: &str = "FILES_DELAY";
/// Environment variable naming a TrueType font to embed in PDFs
pub const ENV_PDF_FONT: &str = "FILE_EXPORT_PDF_FONT";

const DEFAULT_BASE_URL: &str = "http://localhost:9003/files";

/// Main File Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Allowed CORS origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Where exports are written and how they are addressed
    #[serde(default)]
    pub export: ExportDirConfig,

    /// Automatic cleanup of export folders
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Tool API server
    #[serde(default)]
    pub tools: ServerConfig,

    /// Static file server
    #[serde(default = "ServerConfig::files_default")]
    pub files: ServerConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            export: ExportDirConfig::default(),
            retention: RetentionConfig::default(),
            tools: ServerConfig::default(),
            files: ServerConfig::files_default(),
        }
    }
}

/// Export directory and public URL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDirConfig {
    /// Root directory holding every export folder
    pub dir: PathBuf,

    /// Public base URL the file server is reachable under
    pub base_url: String,

    /// Whether `base_url` came from an explicit override
    #[serde(skip)]
    pub base_url_overridden: bool,

    /// TrueType font embedded in PDFs; built-in Helvetica (WinAnsi only) when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_font: Option<PathBuf>,
}

impl Default for ExportDirConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/output"),
            base_url: DEFAULT_BASE_URL.to_string(),
            base_url_overridden: false,
            pdf_font: None,
        }
    }
}

/// Retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Default value of the per-call `persistent` flag
    pub persistent: bool,

    /// Minutes to wait before deleting a non-persistent export
    pub delay_minutes: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            persistent: false,
            delay_minutes: 60,
        }
    }
}

impl RetentionConfig {
    /// Retention delay as a `Duration`
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.delay_minutes.saturating_mul(60))
    }
}

/// HTTP server bind configuration. A table that is present must name its port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    fn files_default() -> Self {
        Self {
            host: default_host(),
            port: 9003,
        }
    }
}

impl ExportConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`ExportConfig::load`], with environment values taken from `lookup`.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid {}: {}", path.display(), e)))?
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_EXPORT_DIR).filter(|v| !v.trim().is_empty()) {
            self.export.dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.export.base_url = url;
            self.export.base_url_overridden = true;
        } else if self.export.base_url != DEFAULT_BASE_URL {
            self.export.base_url_overridden = true;
        }
        self.export.base_url = self.export.base_url.trim_end_matches('/').to_string();

        if let Some(font) = lookup(ENV_PDF_FONT).filter(|v| !v.trim().is_empty()) {
            self.export.pdf_font = Some(PathBuf::from(font));
        }

        if let Some(value) = lookup(ENV_PERSISTENT) {
            self.retention.persistent = parse_bool(&value).ok_or_else(|| {
                Error::Config(format!("{} must be a boolean, got '{}'", ENV_PERSISTENT, value))
            })?;
        }

        if let Some(value) = lookup(ENV_DELAY_MINUTES) {
            self.retention.delay_minutes = value.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of minutes, got '{}'",
                    ENV_DELAY_MINUTES, value
                ))
            })?;
        }

        Ok(())
    }

    /// Log the effective configuration once at startup
    pub fn announce(&self) {
        if self.export.base_url_overridden {
            tracing::info!(base_url = %self.export.base_url, "{} set", ENV_BASE_URL);
        } else {
            tracing::warn!(
                base_url = %self.export.base_url,
                "{} not set; using default",
                ENV_BASE_URL
            );
        }
        tracing::info!(
            export_dir = %self.export.dir.display(),
            persistent = self.retention.persistent,
            delay_minutes = self.retention.delay_minutes,
            "Export configuration"
        );
        if let Some(font) = &self.export.pdf_font {
            tracing::info!(font = %font.display(), "Embedding PDF font");
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
