//! Configuration management.
//!
//! Configuration is layered: an optional TOML file supplies values, anything it
//! omits falls back to built-in defaults, and `GHIBLI_*` environment variables
//! override the result.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GHIBLI_CONFIG_PATH";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GHIBLI_API_URL";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GHIBLI_DATA_DIR";
/// Environment variable overriding the collection page limit.
pub const PAGE_LIMIT_ENV: &str = "GHIBLI_PAGE_LIMIT";

/// File name of the local store inside the data directory.
pub const DATABASE_FILE: &str = "favorites.db";

const APP_NAME: &str = "ghibli";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhibliConfig {
    /// Remote catalog settings.
    pub api: ApiConfig,
    /// Directory holding the local store.
    pub data_dir: PathBuf,
    /// Logging settings applied by the binary.
    pub logging: LoggingSettings,
}

/// Remote catalog settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub base_url: String,
    /// Value of the `limit` query parameter on collection fetches.
    pub page_limit: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: crate::api::HttpRemoteClient::DEFAULT_BASE_URL.to_string(),
            page_limit: crate::api::HttpRemoteClient::DEFAULT_PAGE_LIMIT,
            timeout: crate::api::HttpRemoteClient::DEFAULT_TIMEOUT,
        }
    }
}

/// Logging settings from the config file.
///
/// Every field is optional; the binary's flags and `RUST_LOG` take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, e.g. `ghibli_core=debug`.
    pub filter: Option<String>,
    /// Log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api: Option<ApiConfigFile>,
    data_dir: Option<String>,
    logging: Option<LoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiConfigFile {
    base_url: Option<String>,
    page_limit: Option<u32>,
    timeout_secs: Option<u64>,
}

impl Default for GhibliConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            data_dir: default_data_dir(),
            logging: LoggingSettings::default(),
        }
    }
}

impl GhibliConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the local store database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default locations.
    ///
    /// Checks `GHIBLI_CONFIG_PATH`, then `<config dir>/ghibli/config.toml`.
    /// Falls back to defaults when neither exists or cannot be loaded.
    #[must_use]
    pub fn load_default() -> Self {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
            match Self::load_from_file(&path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring config file");
                },
            }
        }

        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join(APP_NAME).join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %platform_config.display(),
                    error = %e,
                    "Ignoring config file"
                ),
            }
        }

        Self::default()
    }

    /// Applies `GHIBLI_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `GHIBLI_PAGE_LIMIT` is not a positive integer.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the page limit is not a positive integer.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|value| !value.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup(PAGE_LIMIT_ENV) {
            self.api.page_limit = parse_page_limit(&limit)?;
        }
        Ok(self)
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(api) = file.api {
            if let Some(base_url) = api.base_url {
                config.api.base_url = base_url.trim_end_matches('/').to_string();
            }
            if let Some(page_limit) = api.page_limit.filter(|limit| *limit > 0) {
                config.api.page_limit = page_limit;
            }
            if let Some(timeout) = api.timeout_secs.filter(|secs| *secs > 0) {
                config.api.timeout = Duration::from_secs(timeout);
            }
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}

fn parse_page_limit(value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(Error::InvalidInput(format!(
            "{PAGE_LIMIT_ENV} must be a positive integer, got '{value}'"
        ))),
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map_or_else(|| PathBuf::from(".ghibli"), |dirs| dirs.data_dir().to_path_buf())
}
