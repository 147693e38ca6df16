//! Configuration parser for loading provider configuration.
//!
//! Configuration is read from a YAML file, then overridden by environment
//! variables (optionally seeded from a `.env` file next to the configuration).

use crate::error::{AuraError, ConfigError, Result};
use std::path::Path;
use tracing::{debug, info};

use super::schema::ProviderConfig;

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "AURA_API_URL";

/// Environment variable supplying the OAuth client id.
pub const ENV_CLIENT_ID: &str = "AURA_CLIENT_ID";

/// Environment variable supplying the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "AURA_CLIENT_SECRET";

/// Environment variable overriding `polling.interval_secs`.
pub const ENV_POLL_INTERVAL: &str = "AURA_POLL_INTERVAL_SECS";

/// Environment variable overriding `polling.timeout_minutes`.
pub const ENV_POLL_TIMEOUT: &str = "AURA_POLL_TIMEOUT_MINUTES";

/// Resolved OAuth client credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API client id.
    pub client_id: String,
    /// API client secret.
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration parser for loading provider configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving the `.env` file.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path used to locate the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ProviderConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(AuraError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AuraError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ProviderConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(ProviderConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            AuraError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })
    }

    /// Loads configuration with process environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override is malformed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ProviderConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies environment overrides, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse.
    pub fn apply_env_overrides<F>(config: &mut ProviderConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            debug!("Overriding api.base_url from environment");
            config.api.base_url = url;
        }

        if let Some(client_id) = lookup(ENV_CLIENT_ID) {
            debug!("Overriding credentials.client_id from environment");
            config.credentials.client_id = Some(client_id);
        }

        if let Some(client_secret) = lookup(ENV_CLIENT_SECRET) {
            debug!("Overriding credentials.client_secret from environment");
            config.credentials.client_secret = Some(client_secret);
        }

        if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
            debug!("Overriding polling.interval_secs from environment");
            config.polling.interval_secs = parse_number(ENV_POLL_INTERVAL, &interval)?;
        }

        if let Some(timeout) = lookup(ENV_POLL_TIMEOUT) {
            debug!("Overriding polling.timeout_minutes from environment");
            config.polling.timeout_minutes = parse_number(ENV_POLL_TIMEOUT, &timeout)?;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                AuraError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Resolves the client credentials from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either credential is missing or empty.
    pub fn credentials(config: &ProviderConfig) -> Result<Credentials> {
        let client_id = non_empty(config.credentials.client_id.as_deref()).ok_or_else(|| {
            ConfigError::MissingCredential {
                name: String::from("client_id"),
                env_var: String::from(ENV_CLIENT_ID),
            }
        })?;
        let client_secret =
            non_empty(config.credentials.client_secret.as_deref()).ok_or_else(|| {
                ConfigError::MissingCredential {
                    name: String::from("client_secret"),
                    env_var: String::from(ENV_CLIENT_SECRET),
                }
            })?;

        Ok(Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        AuraError::Config(ConfigError::validation(
            format!("{name} must be a non-negative integer, got '{raw}'"),
            name,
        ))
    })
}
