//! Error types for the Aura reconciler.
//!
//! Errors are grouped by the layer that raises them: configuration, the remote
//! Aura API (transport, decoding, dispatch) and the reconciler (polling). Every
//! caller-visible failure renders as a single message, carrying the HTTP status
//! code where one is available.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Aura reconciler.
#[derive(Debug, Error)]
pub enum AuraError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Aura API errors.
    #[error("Aura API error: {0}")]
    Api(#[from] ApiError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A client credential is neither configured nor present in the environment.
    #[error("Missing credential {name}: set it in the configuration or via {env_var}")]
    MissingCredential {
        /// Credential field name.
        name: String,
        /// Environment variable that can supply it.
        env_var: String,
    },

    /// A tenant identifier is not a UUID.
    #[error("Invalid tenant id '{tenant_id}': must be a UUID")]
    InvalidTenantId {
        /// The rejected tenant identifier.
        tenant_id: String,
    },
}

/// Aura API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token exchange was rejected.
    #[error("Aura authentication failed ({status}): {message}")]
    AuthenticationFailed {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// The API rejected the request with an error envelope.
    #[error("{status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// First message of the error envelope.
        message: String,
    },

    /// The API answered with a status code this client does not handle.
    #[error("Unhandled HTTP {status} while {operation}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// What the client was doing.
        operation: String,
    },

    /// The resource does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind.
        kind: String,
        /// Resource identifier.
        id: String,
    },

    /// Non-timeout transport failure (DNS, refused connection, TLS).
    #[error("Network error communicating with Aura: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// Every attempt of a request timed out.
    #[error("Unable to execute {method} request after {attempts} attempts (url: {url})")]
    RetriesExhausted {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from Aura API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// The pre-flight check found a resource with the requested name.
    #[error("{kind} {name} already exists")]
    DuplicateName {
        /// Resource kind.
        kind: String,
        /// The duplicated name.
        name: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The action did not reach its terminal status within the poll budget.
    #[error("Exceeded max number of tries ({attempts}) for {action} {kind} {id}")]
    Timeout {
        /// Progressive form of the action (e.g. "pausing").
        action: String,
        /// Resource kind.
        kind: String,
        /// Resource identifier.
        id: String,
        /// Number of polls made.
        attempts: u32,
    },

    /// No completion rule exists for this action on this resource kind.
    #[error("Action {action} is not supported for {kind}")]
    UnsupportedAction {
        /// Action name.
        action: String,
        /// Resource kind.
        kind: String,
    },

    /// The caller cancelled the wait.
    #[error("Cancelled while {action} {id}")]
    Cancelled {
        /// Progressive form of the action.
        action: String,
        /// Resource identifier.
        id: String,
    },

    /// Fetching the resource status failed.
    #[error("Failed to poll {id} while {action}: {source}")]
    PollFailed {
        /// Progressive form of the action.
        action: String,
        /// Resource identifier.
        id: String,
        /// Underlying fetch error.
        #[source]
        source: Box<AuraError>,
    },
}

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, AuraError>;

impl AuraError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the error means the resource no longer exists.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::NotFound { .. } | ApiError::RequestFailed { status: 404, .. })
        )
    }

    /// Returns the HTTP status code attached to the error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(
                ApiError::AuthenticationFailed { status, .. }
                | ApiError::RequestFailed { status, .. }
                | ApiError::UnexpectedStatus { status, .. },
            ) => Some(*status),
            Self::Api(ApiError::NotFound { .. }) => Some(404),
            Self::Reconcile(ReconcileError::PollFailed { source, .. }) => source.status_code(),
            _ => None,
        }
    }

    /// Returns true if re-running the same request may succeed.
    ///
    /// Poll timeouts are not retryable: the remote action may still be running,
    /// so the resource has to be re-read first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(ApiError::RetriesExhausted { .. }))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates a request error from a decoded error envelope.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
