//! Configuration loading and merging: defaults, then an optional TOML or
//! JSON file, then environment variables, then CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Cli, OutputFormat};
use crate::error::ConfigError;
use crate::finding::Mode;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
}

/// Validation-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validation mode
    pub mode: Mode,
    /// Expected document year for date checks
    pub expected_year: Option<i32>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
    /// Base URL of the metadata API
    pub base_url: String,
    /// Skip all remote lookups
    pub offline: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let defaults = crate::remote::RemoteConfig::default();
        Self {
            timeout_seconds: defaults.timeout_seconds,
            base_url: defaults.base_url,
            offline: false,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment
    /// -> CLI.
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ConfigError::InvalidFormat {
                    details: format!("{}: {}", path.display(), e),
                })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
                details: e.to_string(),
            }),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
                    details: e.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidFormat {
                details: format!(
                    "{}: expected a .toml or .json configuration file",
                    path.display()
                ),
            }),
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = ["rfcnits.toml", ".rfcnits.toml"];

        // Check current directory first
        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("rfcnits");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(timeout) = env.get("RFCNITS_TIMEOUT") {
            config.network.timeout_seconds =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "RFCNITS_TIMEOUT".to_string(),
                    value: timeout,
                    reason: "expected a number of seconds".to_string(),
                })?;
        }

        if let Some(base_url) = env.get("RFCNITS_BASE_URL") {
            config.network.base_url = base_url;
        }

        if let Some(offline) = env.get("RFCNITS_OFFLINE") {
            config.network.offline = offline.parse().map_err(|_| ConfigError::InvalidValue {
                field: "RFCNITS_OFFLINE".to_string(),
                value: offline,
                reason: "expected true or false".to_string(),
            })?;
        }

        if let Some(mode) = env.get("RFCNITS_MODE") {
            config.validation.mode = match mode.as_str() {
                "normal" => Mode::Normal,
                "forgive-checklist" => Mode::ForgiveChecklist,
                "submission" => Mode::Submission,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "RFCNITS_MODE".to_string(),
                        value: mode,
                        reason: "expected normal, forgive-checklist, or submission".to_string(),
                    });
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence; flags
    /// left unset keep the configured value)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(mode) = cli.mode {
            config.validation.mode = mode;
        }
        if let Some(year) = cli.year {
            config.validation.expected_year = Some(year);
        }
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }
        if cli.offline {
            config.network.offline = true;
        }
        if let Some(format) = cli.output {
            config.output.format = format;
        }
        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if config.network.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "network.base_url".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Convert configuration to Duration for network timeout
    pub fn get_timeout_duration(config: &Config) -> Duration {
        Duration::from_secs(config.network.timeout_seconds)
    }
}
