//! # Configuration Management
//!
//! Settings for reaching the platform's control plane. Values are resolved
//! in order of precedence: explicit overrides (CLI flags), environment
//! variables, the `~/.routeplane/config.toml` file, then built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::errors::{Result, RouteError};

pub const ENV_API_URL: &str = "ROUTEPLANE_API_URL";
pub const ENV_TOKEN: &str = "ROUTEPLANE_TOKEN";
pub const ENV_TIMEOUT: &str = "ROUTEPLANE_TIMEOUT";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Control-plane client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientSettings {
    /// Base URL of the control plane API
    #[validate(length(min = 1, message = "API URL cannot be empty"))]
    pub api_url: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_secs: u64,

    /// Log request and response bodies at trace level
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verbose: false,
        }
    }
}

/// Settings as stored in the config file; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Get the default configuration file path (~/.routeplane/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| RouteError::config("Unable to determine home directory"))?;

        let mut path = PathBuf::from(home);
        path.push(format!(".{}", crate::APP_NAME));
        path.push("config.toml");

        Ok(path)
    }

    /// Load a config file; a missing file yields empty settings
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            RouteError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }
}

/// Values that take precedence over everything else
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub verbose: bool,
}

impl ClientSettings {
    /// Resolve settings from the default config file, environment and overrides
    pub fn load(overrides: Overrides) -> Result<Self> {
        let file = ConfigFile::load_from_path(&ConfigFile::default_path()?)?;
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the sources in precedence order and validate the result
    pub fn resolve<E>(file: ConfigFile, env: E, overrides: Overrides) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(api_url) = file.api_url {
            settings.api_url = api_url;
        }
        if file.token.is_some() {
            settings.token = file.token;
        }
        if let Some(timeout) = file.timeout_secs {
            settings.timeout_secs = timeout;
        }

        if let Some(api_url) = env(ENV_API_URL) {
            settings.api_url = api_url;
        }
        if let Some(token) = env(ENV_TOKEN) {
            settings.token = Some(token);
        }
        if let Some(timeout) = env(ENV_TIMEOUT) {
            settings.timeout_secs = timeout.parse().map_err(|e| {
                RouteError::config(format!("Invalid {} '{}': {}", ENV_TIMEOUT, timeout, e))
            })?;
        }

        if let Some(api_url) = overrides.api_url {
            settings.api_url = api_url;
        }
        if overrides.token.is_some() {
            settings.token = overrides.token;
        }
        if let Some(timeout) = overrides.timeout_secs {
            settings.timeout_secs = timeout;
        }
        settings.verbose = overrides.verbose;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate field constraints
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|errors| {
            let message = errors
                .field_errors()
                .iter()
                .map(|(field, field_errors)| {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                        })
                        .collect();
                    format!("{}: {}", field, messages.join(", "))
                })
                .collect::<Vec<_>>()
                .join("; ");
            RouteError::config(format!("Validation failed: {}", message))
        })
    }
}
