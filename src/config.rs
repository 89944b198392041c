//! payqr runtime configuration handling

use crate::error::{Error, Result};
use crate::transcode::QrCharset;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayqrConfig {
    /// QR rendering options
    pub qr: QrOptions,
    /// Where the form record is persisted
    pub storage: StorageOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl PayqrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No payqr.toml / payqr.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["payqr.toml", "payqr.yaml", "payqr.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("payqr");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.qr.apply_env_overrides()?;
        self.storage.apply_env_overrides();
        self.logging.apply_env_overrides();
        Ok(())
    }
}

/// QR error-correction level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EcLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            other => Err(format!(
                "Unknown error-correction level '{other}', expected L, M, Q or H"
            )),
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Styling and encoding of the rendered QR code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QrOptions {
    /// Minimum edge length of the graphic in pixels
    pub size: u32,
    /// Module (dark) color
    pub foreground: String,
    /// Background (light) color
    pub background: String,
    /// Error-correction level
    pub ec_level: EcLevel,
    /// Byte encoding of the payload inside the symbol
    pub charset: QrCharset,
    /// Surround the code with the standard four-module quiet zone
    pub quiet_zone: bool,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 256,
            foreground: "#000".to_string(),
            background: "#fff".to_string(),
            ec_level: EcLevel::M,
            charset: QrCharset::Windows1251,
            quiet_zone: true,
        }
    }
}

impl QrOptions {
    pub(crate) fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(size) = env::var("PAYQR_QR_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.size = parsed.max(21);
            }
        }
        if let Ok(color) = env::var("PAYQR_QR_FOREGROUND") {
            self.foreground = color;
        }
        if let Ok(color) = env::var("PAYQR_QR_BACKGROUND") {
            self.background = color;
        }
        if let Ok(level) = env::var("PAYQR_QR_EC_LEVEL") {
            self.ec_level = level.parse().map_err(Error::Config)?;
        }
        if let Ok(charset) = env::var("PAYQR_QR_CHARSET") {
            self.charset = charset.parse().map_err(Error::Config)?;
        }
        Ok(())
    }
}

/// Location of the persisted form record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// JSON file holding persisted records
    pub path: PathBuf,
    /// Key under which the form record is stored
    pub key: String,
}

impl Default for StorageOptions {
    fn default() -> Self {
        let path = match env::var_os("XDG_DATA_HOME") {
            Some(base) => PathBuf::from(base).join("payqr").join("form.json"),
            None => PathBuf::from("payqr-form.json"),
        };

        Self {
            path,
            key: "qrForm".to_string(),
        }
    }
}

impl StorageOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("PAYQR_STORE_PATH") {
            if !path.trim().is_empty() {
                self.path = PathBuf::from(path);
            }
        }
        if let Ok(key) = env::var("PAYQR_STORE_KEY") {
            if !key.trim().is_empty() {
                self.key = key;
            }
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `PAYQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("PAYQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("PAYQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("PAYQR_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("PAYQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
