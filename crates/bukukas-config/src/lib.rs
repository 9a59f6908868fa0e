//! Configuration management for bukukas
//!
//! This module handles loading, validation, and management of
//! bukukas configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Cross-origin settings for the browser frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; an entry may contain one `*` wildcard
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Preflight cache duration
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://*.vercel.app".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://localhost:8000".to_string(),
        "http://127.0.0.1:8000".to_string(),
    ]
}

fn default_max_age_secs() -> u64 {
    86400
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Accepted file extensions (lowercase, without dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "xls".to_string(), "csv".to_string()]
}

/// Ingest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Category used for a bare `Penerimaan` column in CSV files
    #[serde(default = "default_category")]
    pub csv_default_receipt_category: String,
    /// Category used for a bare `Pengeluaran` column in CSV files
    #[serde(default = "default_category")]
    pub csv_default_expense_category: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_default_receipt_category: default_category(),
            csv_default_expense_category: default_category(),
        }
    }
}

fn default_category() -> String {
    "Umum".to_string()
}

/// How the `Tanggal` column is rendered on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `2024-09-24`
    Iso,
    /// `24 September 2024`
    Long,
}

impl Default for DateStyle {
    fn default() -> Self {
        DateStyle::Iso
    }
}

impl std::str::FromStr for DateStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iso" => Ok(DateStyle::Iso),
            "long" => Ok(DateStyle::Long),
            _ => Err(format!("Invalid date style: {}", s)),
        }
    }
}

impl std::fmt::Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Iso => write!(f, "iso"),
            DateStyle::Long => write!(f, "long"),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Date rendering for the `Tanggal` column
    #[serde(default)]
    pub date_style: DateStyle,
    /// Emit a `Jumlah` column (per-row net amount) before `Saldo`
    #[serde(default)]
    pub include_net_column: bool,
    /// Spreadsheet number format for amount cells
    #[serde(default = "default_number_format")]
    pub number_format: String,
    /// Download file name prefix
    #[serde(default = "default_export_prefix")]
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            date_style: DateStyle::Iso,
            include_net_column: false,
            number_format: default_number_format(),
            filename_prefix: default_export_prefix(),
        }
    }
}

fn default_number_format() -> String {
    "#,##0_);(#,##0)".to_string()
}

fn default_export_prefix() -> String {
    "accounting_export".to_string()
}

/// Template download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Download file name prefix
    #[serde(default = "default_template_prefix")]
    pub filename_prefix: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            filename_prefix: default_template_prefix(),
        }
    }
}

fn default_template_prefix() -> String {
    "accounting_template".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// CORS settings
    #[serde(default)]
    pub cors: CorsConfig,
    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,
    /// Ingest settings
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Template settings
    #[serde(default)]
    pub template: TemplateConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().into_owned(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Io {
                path: path.to_string_lossy().into_owned(),
                source: e,
            })?;

        Self::from_yaml(&content)
    }

    /// Load the file when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path.to_path_buf())
        } else {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Apply overrides from the process environment (`PORT`)
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                reason: format!("'{}' is not a valid port number", port),
            })?;
        }
        self.validate()
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.upload.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload.max_bytes".to_string(),
                reason: "Upload limit must be greater than 0".to_string(),
            });
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::MissingField {
                field: "upload.allowed_extensions".to_string(),
            });
        }

        if self.ingest.csv_default_receipt_category.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ingest.csv_default_receipt_category".to_string(),
                reason: "Category name must not be empty".to_string(),
            });
        }

        if self.ingest.csv_default_expense_category.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ingest.csv_default_expense_category".to_string(),
                reason: "Category name must not be empty".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Check whether an upload extension is accepted
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.upload
            .allowed_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}
