//! Configuration management for notion-md.
//!
//! Parses `notion-md.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `notion.token`
//! - `notion.base_url`
//! - `notion.version`
//!
//! When no token is configured, it is read from `NOTION_TOKEN`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use expand::EnvExpander;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override integration token.
    pub token: Option<String>,
    /// Override fetch concurrency.
    pub concurrency: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "notion-md.toml";

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "NOTION_TOKEN";

/// Upper bound for `fetch.concurrency`.
const MAX_CONCURRENCY: usize = 64;

/// Upper bound for `fetch.page_size` accepted by the API.
const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content API connection settings.
    pub notion: NotionConfig,
    /// Tree fetching settings.
    pub fetch: FetchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Content API connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token.
    pub token: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub version: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.notion.com/v1".to_owned(),
            version: "2022-06-28".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl NotionConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate connection settings (the token is checked on use).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "notion.base_url")?;
        require_http_url(&self.base_url, "notion.base_url")?;
        require_non_empty(&self.version, "notion.version")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "notion.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Tree fetching settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum concurrent children fetches.
    pub concurrency: usize,
    /// Maximum children pages fetched for one block.
    pub max_pages: usize,
    /// Children requested per page.
    pub page_size: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_pages: 1000,
            page_size: 100,
        }
    }
}

impl FetchConfig {
    /// Validate fetch settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::Validation(format!(
                "fetch.concurrency must be between 1 and {MAX_CONCURRENCY}"
            )));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_pages must be greater than 0".to_owned(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Validation(format!(
                "fetch.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),

    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`notion.token`").
        field: String,
        /// Error message (e.g., "${`NOTION_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `notion-md.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// CLI settings are applied last, so CLI arguments take precedence over
    /// config file values and the environment.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_env_token(|name| std::env::var(name).ok());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the validated integration token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no non-empty token is configured.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.notion.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::Validation(format!(
                "notion.token is required (set it in {CONFIG_FILENAME}, {TOKEN_ENV} or --token)"
            ))),
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.notion.validate()?;
        self.fetch.validate()?;
        Ok(())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(token) = &settings.token {
            self.notion.token = Some(token.clone());
        }
        if let Some(concurrency) = settings.concurrency {
            self.fetch.concurrency = concurrency;
        }
    }

    /// Fill in the token from the environment when the file has none.
    fn apply_env_token(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.notion.token.is_none() {
            self.notion.token = lookup(TOKEN_ENV).filter(|token| !token.is_empty());
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars(|name| std::env::var(name).ok())?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Expand `${VAR}` references in configuration strings.
    fn expand_env_vars(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let expander = EnvExpander::new(lookup);
        self.notion.token = expander.token(self.notion.token.as_deref())?;
        self.notion.base_url = expander.field(&self.notion.base_url, "notion.base_url")?;
        self.notion.version = expander.field(&self.notion.version, "notion.version")?;
        Ok(())
    }
}
