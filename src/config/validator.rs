//! Configuration validation.
//!
//! Catches settings that would make every request or every poll fail before
//! any call reaches the remote API.

use crate::error::{AuraError, ConfigError, Result};
use reqwest::Url;
use tracing::debug;

use super::schema::{ApiConfig, PollingConfig, ProviderConfig};

/// Validator for provider configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a provider configuration, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self, config: &ProviderConfig) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_api(&config.api, &mut errors);
        Self::validate_polling(&config.polling, &mut errors);

        match errors.into_iter().next() {
            None => {
                debug!("Configuration validation passed");
                Ok(())
            }
            Some(first) => Err(AuraError::Config(ConfigError::validation(
                first.message,
                first.field,
            ))),
        }
    }

    fn validate_api(api: &ApiConfig, errors: &mut Vec<ValidationError>) {
        match Url::parse(&api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError {
                field: String::from("api.base_url"),
                message: format!("Unsupported URL scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: String::from("api.base_url"),
                message: format!("Invalid base URL '{}': {e}", api.base_url),
            }),
        }

        if api.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: String::from("api.request_timeout_secs"),
                message: String::from("Request timeout must be greater than zero"),
            });
        }

        if api.max_attempts == 0 {
            errors.push(ValidationError {
                field: String::from("api.max_attempts"),
                message: String::from("At least one request attempt is required"),
            });
        }
    }

    fn validate_polling(polling: &PollingConfig, errors: &mut Vec<ValidationError>) {
        if polling.interval_secs == 0 {
            errors.push(ValidationError {
                field: String::from("polling.interval_secs"),
                message: String::from("Poll interval must be greater than zero"),
            });
        } else if polling.timeout_minutes.saturating_mul(60) < polling.interval_secs {
            errors.push(ValidationError {
                field: String::from("polling.timeout_minutes"),
                message: format!(
                    "Poll timeout of {} minutes is shorter than one {}s interval",
                    polling.timeout_minutes, polling.interval_secs
                ),
            });
        }
    }
}

/// Validates that a tenant identifier is a UUID.
///
/// # Errors
///
/// Returns an error if the identifier does not parse as a UUID.
pub fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    uuid::Uuid::parse_str(tenant_id)
        .map(|_| ())
        .map_err(|_| {
            AuraError::Config(ConfigError::InvalidTenantId {
                tenant_id: tenant_id.to_string(),
            })
        })
}
