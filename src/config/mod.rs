//! Configuration module for the Aura reconciler.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing the provider YAML file
//! - Environment and `.env` overrides, credential resolution
//! - Validation of configuration values

mod schema;
mod parser;
mod validator;

pub use schema::{ApiConfig, CredentialsConfig, PollingConfig, ProviderConfig, DEFAULT_BASE_URL};
pub use parser::{
    ConfigParser, Credentials, ENV_API_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_POLL_INTERVAL,
    ENV_POLL_TIMEOUT,
};
pub use validator::{validate_tenant_id, ConfigValidator, ValidationError};
