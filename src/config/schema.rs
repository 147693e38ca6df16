//! Configuration schema for the reconciler.
//!
//! These structs map to the provider configuration YAML file. Every section is
//! optional; omitted values fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Default Aura API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.neo4j.io";

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// HTTP transport settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Completion polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
    /// OAuth client credentials.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the Aura API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Attempts made when a request times out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between timed-out attempts in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

/// Completion polling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    /// Delay between status polls in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Total polling budget in minutes.
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
    /// Initial polls during which the terminal status is not trusted.
    #[serde(default = "default_warmup_ticks")]
    pub warmup_ticks: u32,
    /// Delay after each warm-up poll in seconds.
    #[serde(default = "default_warmup_delay_secs")]
    pub warmup_delay_secs: u64,
    /// Delay after the terminal status is observed, in seconds.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

/// OAuth client credentials.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// API client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// API client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_minutes: default_timeout_minutes(),
            warmup_ticks: default_warmup_ticks(),
            warmup_delay_secs: default_warmup_delay_secs(),
            settle_delay_secs: default_settle_delay_secs(),
        }
    }
}

fn default_base_url() -> String {
    String::from(DEFAULT_BASE_URL)
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_retry_delay_secs() -> u64 {
    15
}

const fn default_interval_secs() -> u64 {
    15
}

const fn default_timeout_minutes() -> u64 {
    30
}

const fn default_warmup_ticks() -> u32 {
    2
}

const fn default_warmup_delay_secs() -> u64 {
    30
}

const fn default_settle_delay_secs() -> u64 {
    60
}
