//! Configuration management for the loader.
//!
//! Configuration is assembled from three sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! Environment variables take precedence over config file values, which take
//! precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use shiki_loader::config::LoaderConfig;
//!
//! // Load from file with env overrides
//! let config = LoaderConfig::load("loader.yaml")?;
//!
//! // Or load from environment only
//! let config = LoaderConfig::from_env()?;
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use shiki_domain::{LoaderError, LoaderResult, ScheduleConfig, DEFAULT_IDS_PER_REQUEST};
use url::Url;

use crate::backend::API_PATH;
use crate::loader::LoaderOptions;

/// Loader configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LoaderConfig {
    /// Resolver settings
    #[serde(default)]
    pub loader: LoaderSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Resolver settings.
///
/// Overridable with `SHIKI_LOADER__<FIELD>`, e.g. `SHIKI_LOADER__BASE_URL`.
///
/// ```yaml
/// loader:
///   base_url: "https://shikimori.one"
///   ids_per_request: 200
///   debounce_ms: 50
///   throttle_ms: 2000
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoaderSettings {
    /// Backend base URL; relative resource URLs are made absolute against it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the batched lookup endpoint below the base URL
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Maximum number of ids per request, across all kinds
    #[serde(default = "default_ids_per_request")]
    pub ids_per_request: usize,

    /// Quiet period before a burst of lookups is dispatched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum interval between two requests
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Responses omitting a key before its lookups fail
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_path: default_api_path(),
            ids_per_request: default_ids_per_request(),
            debounce_ms: default_debounce_ms(),
            throttle_ms: default_throttle_ms(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://shikimori.one".to_string()
}

fn default_api_path() -> String {
    API_PATH.to_string()
}

fn default_ids_per_request() -> usize {
    DEFAULT_IDS_PER_REQUEST
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_throttle_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

impl LoaderSettings {
    /// Parses the base URL.
    pub fn base_url(&self) -> LoaderResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|err| LoaderError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoaderError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "scheme must be http or https".to_string(),
            });
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Runtime options of the resolver.
    pub fn options(&self) -> LoaderResult<LoaderOptions> {
        let schedule = ScheduleConfig::default()
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_throttle(Duration::from_millis(self.throttle_ms));

        Ok(LoaderOptions::new(self.base_url()?)
            .with_ids_per_request(self.ids_per_request)
            .with_schedule(schedule)
            .with_max_attempts(self.max_attempts))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl LoaderConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `SHIKI_` and use `__` as separator:
    /// - `SHIKI_LOADER__BASE_URL=...` overrides `loader.base_url`
    /// - `SHIKI_LOGGING__LEVEL=debug` overrides `logging.level`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&LoaderConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(
                Environment::with_prefix("SHIKI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loader_config: LoaderConfig = config.try_deserialize()?;
        loader_config.validate()?;

        Ok(loader_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&LoaderConfig::default())?)
            .add_source(
                Environment::with_prefix("SHIKI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loader_config: LoaderConfig = config.try_deserialize()?;
        loader_config.validate()?;

        Ok(loader_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if let Err(err) = self.loader.base_url() {
            return Err(ConfigLoadError::Invalid {
                message: format!("loader.base_url: {err}"),
            });
        }

        if self.loader.ids_per_request == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "loader.ids_per_request must be greater than 0".to_string(),
            });
        }

        if self.loader.max_attempts == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "loader.max_attempts must be greater than 0".to_string(),
            });
        }

        if self.loader.api_path.trim().is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: "loader.api_path cannot be empty".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test: Can load config from YAML file
    #[test]
    #[serial]
    fn test_can_load_config_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
loader:
  base_url: "http://localhost:3000"
  ids_per_request: 50
  debounce_ms: 10
  throttle_ms: 500
  max_attempts: 5

logging:
  level: debug
  json: true
"#
        )
        .unwrap();

        let config = LoaderConfig::load(file.path()).unwrap();

        assert_eq!(config.loader.base_url, "http://localhost:3000");
        assert_eq!(config.loader.api_path, "api/shiki_editor");
        assert_eq!(config.loader.ids_per_request, 50);
        assert_eq!(config.loader.debounce_ms, 10);
        assert_eq!(config.loader.throttle_ms, 500);
        assert_eq!(config.loader.max_attempts, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    /// Test: Can override config with env vars
    #[test]
    #[serial]
    fn test_can_override_config_with_env_vars() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
loader:
  base_url: "http://localhost:3000"
  ids_per_request: 50
"#
        )
        .unwrap();

        std::env::set_var("SHIKI_LOADER__IDS_PER_REQUEST", "20");
        std::env::set_var("SHIKI_LOGGING__LEVEL", "warn");

        let config = LoaderConfig::load(file.path()).unwrap();

        std::env::remove_var("SHIKI_LOADER__IDS_PER_REQUEST");
        std::env::remove_var("SHIKI_LOGGING__LEVEL");

        assert_eq!(config.loader.ids_per_request, 20); // Overridden by env
        assert_eq!(config.loader.base_url, "http://localhost:3000"); // From file
        assert_eq!(config.logging.level, "warn"); // Overridden by env
    }

    /// Test: from_env loads defaults with env overrides
    #[test]
    #[serial]
    fn test_from_env_loads_defaults_with_env_overrides() {
        std::env::set_var("SHIKI_LOADER__BASE_URL", "https://shiki.example");

        let config = LoaderConfig::from_env().unwrap();

        std::env::remove_var("SHIKI_LOADER__BASE_URL");

        assert_eq!(config.loader.base_url, "https://shiki.example");
        assert_eq!(config.loader.throttle_ms, 2000); // default
    }

    /// Test: Config validation catches errors
    #[test]
    fn test_config_validation_catches_errors() {
        let test_cases: [(&str, fn(&mut LoaderConfig)); 5] = [
            ("loader.base_url", |c| c.loader.base_url = "not a url".into()),
            ("loader.base_url", |c| c.loader.base_url = "ftp://host".into()),
            ("loader.ids_per_request", |c| c.loader.ids_per_request = 0),
            ("loader.max_attempts", |c| c.loader.max_attempts = 0),
            ("logging.level", |c| c.logging.level = "loud".into()),
        ];

        for (field, mutate) in test_cases {
            let mut config = LoaderConfig::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(field),
                "error for '{field}' should mention it: {err}"
            );
        }
    }

    /// Test: Invalid config returns clear error
    #[test]
    fn test_invalid_config_returns_clear_error() {
        let result = LoaderConfig::load("/nonexistent/path/loader.yaml");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: syntax: [").unwrap();

        let err = LoaderConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Load(_)));
    }

    /// Test: Default config is valid
    #[test]
    fn test_default_config_is_valid() {
        let config = LoaderConfig::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.loader.base_url, "https://shikimori.one");
        assert_eq!(config.loader.ids_per_request, 200);
        assert_eq!(config.loader.debounce_ms, 50);
        assert_eq!(config.loader.throttle_ms, 2000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_settings_build_loader_options() {
        let settings = LoaderSettings {
            ids_per_request: 10,
            debounce_ms: 5,
            throttle_ms: 100,
            max_attempts: 2,
            ..Default::default()
        };

        let options = settings.options().unwrap();

        assert_eq!(options.base_url.as_str(), "https://shikimori.one/");
        assert_eq!(options.ids_per_request, 10);
        assert_eq!(options.schedule.debounce, Duration::from_millis(5));
        assert_eq!(options.schedule.throttle, Duration::from_millis(100));
        assert_eq!(options.max_attempts, 2);
    }
}
