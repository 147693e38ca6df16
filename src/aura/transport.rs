//! HTTP transport for the Aura API.
//!
//! A [`Transport`] issues exactly one logical request and hands back the raw
//! status and body. It never interprets application-level status codes; that
//! is left to the decoder and the dispatcher.

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, AuraError, Result};

/// Bearer token obtained from the OAuth token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Request authentication.
#[derive(Clone)]
pub enum Auth {
    /// Bearer token, used for every resource operation.
    Bearer(AccessToken),
    /// HTTP basic auth, used only for the token exchange.
    Basic {
        /// OAuth client id.
        client_id: String,
        /// OAuth client secret.
        client_secret: String,
    },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
            Self::Basic { client_id, .. } => f
                .debug_struct("Basic")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

/// A single request against the Aura API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Authentication to attach.
    pub auth: Auth,
}

impl ApiRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, auth: Auth) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            auth,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw status and body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to the Aura API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request, retrying only connection-level timeouts.
    async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// Runtime HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Base URL of the Aura API.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Attempts made when a request times out.
    pub max_attempts: u32,
    /// Delay between timed-out attempts.
    pub retry_delay: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for HttpSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client.
    client: Client,
    /// Transport settings.
    settings: HttpSettings,
}

impl HttpTransport {
    /// Creates a transport with the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn send_once(&self, url: &str, request: &ApiRequest) -> reqwest::Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(header::CONTENT_TYPE, "application/json");

        builder = match &request.auth {
            Auth::Bearer(token) => builder.bearer_auth(token.secret()),
            Auth::Basic {
                client_id,
                client_secret,
            } => builder.basic_auth(client_id, Some(client_secret)),
        };

        if let Some(body) = &request.body {
            trace!("Request body: {body}");
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.url(&request.path);
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.send_once(&url, &request).await {
                Ok(response) => {
                    debug!("{} {url} -> {}", request.method, response.status);
                    return Ok(response);
                }
                Err(e) if e.is_timeout() => {
                    warn!(
                        method = %request.method,
                        url = %url,
                        attempt,
                        max_attempts,
                        "Request timed out"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.settings.retry_delay).await;
                    }
                }
                Err(e) => {
                    return Err(AuraError::Api(ApiError::network(format!(
                        "{} {url} failed: {e}",
                        request.method
                    ))));
                }
            }
        }

        Err(AuraError::Api(ApiError::RetriesExhausted {
            method: request.method.to_string(),
            url,
            attempts: max_attempts,
        }))
    }
}
