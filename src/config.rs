//! Application configuration management.
//!
//! Configuration is a TOML file with `[api]`, `[app]` and `[logging]`
//! sections, discovered in priority order: an explicit `--config` path,
//! `zbxcli.toml` in the current directory, then the user config directory.
//! When no file exists at all, a default one is created at the canonical
//! location so the user has something to edit.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::output::console;

/// Config file basename.
pub const CONFIG_FILENAME: &str = "zbxcli.toml";

/// Directory name under the user's config/data directories.
const APP_DIR: &str = "zbxcli";

/// Environment variable consulted for the API username.
pub const ENV_USERNAME: &str = "ZABBIX_CLI_USERNAME";

/// Environment variable consulted for the API password.
pub const ENV_PASSWORD: &str = "ZABBIX_CLI_PASSWORD";

// ============================================================================
// Output format
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server base URL, without the `api_jsonrpc.php` endpoint path.
    pub url: String,
    pub username: String,
    /// Never written back out when dumping the config.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Pre-shared API token. Never written back out when dumping the config.
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: "Admin".to_string(),
            password: None,
            auth_token: None,
            verify_ssl: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_hostgroups: Vec<String>,
    pub default_create_user_usergroups: Vec<String>,
    /// Persist sessions to the auth token file and restore them on startup
    /// instead of logging in (and out) on every invocation.
    pub use_auth_token_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_file: Option<PathBuf>,
    /// Load credential files even when their permissions are broader than 0600.
    pub allow_insecure_authfile: bool,
    pub output_format: OutputFormat,
    /// Render JSON output as a `{"0": ..., "1": ...}` map like the previous
    /// CLI generation did.
    pub legacy_json_format: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_directory: Option<PathBuf>,
    pub include_timestamp_export_filename: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_hostgroups: vec!["All-hosts".to_string()],
            default_create_user_usergroups: vec!["All-users".to_string()],
            use_auth_token_file: false,
            auth_token_file: None,
            auth_file: None,
            allow_insecure_authfile: false,
            output_format: OutputFormat::Table,
            legacy_json_format: false,
            export_directory: None,
            include_timestamp_export_filename: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub log_level: String,
    /// Log to this file instead of stderr when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "error".to_string(),
            log_file: None,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// A starting-point configuration pointing at a placeholder server.
    pub fn sample() -> Self {
        let mut config = Self::default();
        config.api.url = "https://zabbix.example.com".to_string();
        config
    }

    /// Load the configuration, creating a default file when none exists.
    ///
    /// An explicit path that does not exist is an error; an absent default
    /// config is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file {} not found",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }
        for candidate in Self::search_paths() {
            if candidate.exists() {
                debug!("found config {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }
        let path = default_config_file();
        let config = Self::sample();
        config.dump_to_file(&path)?;
        console::info(&format!(
            "No config file found. Created a default one at {}",
            path.display()
        ));
        Ok(Self {
            config_path: Some(path),
            ..config
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Unable to read config file {}: {e}", path.display()))
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Malformed config file {}: {e}", path.display()))
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Dump the configuration to a TOML string. Secrets are excluded.
    pub fn as_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Unable to serialize config: {e}")))
    }

    pub fn dump_to_file(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Unable to create directory {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(path, self.as_toml()?).map_err(|e| {
            AppError::Config(format!("Unable to create config file {}: {e}", path.display()))
        })?;
        info!("wrote config file {}", path.display());
        Ok(())
    }

    /// Directory that export files are written to.
    pub fn export_directory(&self) -> PathBuf {
        self.app
            .export_directory
            .clone()
            .unwrap_or_else(|| data_dir().join("exports"))
    }

    fn search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(CONFIG_FILENAME),
            default_config_file(),
        ]
    }
}

// ============================================================================
// Directories
// ============================================================================

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILENAME)
}
