//! Typed Aura API client.
//!
//! Wraps a [`Transport`] with the response decoder: every call yields either a
//! typed value or a single-message error carrying the HTTP status code.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::{ConfigValidator, ProviderConfig};
use crate::error::{ApiError, AuraError, Result};

use super::decode;
use super::transport::{AccessToken, ApiRequest, Auth, HttpSettings, HttpTransport, Transport};
use super::types::{Resource, ResourceKind, ResourceSummary};

/// A decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Normalized body. Non-JSON error bodies are kept as a string.
    pub tree: Value,
}

impl ApiResponse {
    /// Returns true for 2xx responses without an error envelope.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && !decode::has_errors(&self.tree)
    }

    /// Returns the single diagnostic message of an error body.
    #[must_use]
    pub fn error_message(&self) -> String {
        decode::first_error_message(&self.tree)
    }

    /// Converts a failed response into a request error.
    #[must_use]
    pub fn into_error(self) -> AuraError {
        AuraError::Api(ApiError::api_error(self.status, self.error_message()))
    }
}

/// Aura API client.
#[derive(Debug, Clone)]
pub struct AuraClient<T = HttpTransport> {
    /// Underlying transport.
    transport: T,
}

impl AuraClient<HttpTransport> {
    /// Creates an HTTP-backed client from a validated provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        ConfigValidator::new().validate(config)?;
        let transport = HttpTransport::new(HttpSettings::from(&config.api))?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> AuraClient<T> {
    /// Creates a client over the given transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request and decodes the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed success body.
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        let raw = self.transport.send(request).await?;
        // Bodies carry access tokens and instance passwords; only their size is logged.
        trace!("{method} {path} -> {} ({} bytes)", raw.status, raw.body.len());

        let tree = if raw.is_success() {
            decode::decode(&raw.body)?
        } else {
            // Gateways answer with HTML or plain text; keep it as the message.
            decode::decode(&raw.body).unwrap_or_else(|_| Value::String(raw.body.trim().to_string()))
        };

        Ok(ApiResponse {
            status: raw.status,
            tree,
        })
    }

    /// Sends an authenticated GET and takes the typed `data` member.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    pub async fn get<D: DeserializeOwned>(&self, token: &AccessToken, path: &str) -> Result<D> {
        let response = self
            .call(ApiRequest::new(Method::GET, path, Auth::Bearer(token.clone())))
            .await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        decode::data(response.tree)
    }

    /// Sends an authenticated POST with a JSON body and takes the typed `data` member.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    pub async fn post<D: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        body: Value,
    ) -> Result<D> {
        let request =
            ApiRequest::new(Method::POST, path, Auth::Bearer(token.clone())).with_body(body);
        let response = self.call(request).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        decode::data(response.tree)
    }

    /// Fetches a single resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or the decoded error otherwise.
    pub async fn fetch<R: Resource>(&self, token: &AccessToken, id: &str) -> Result<R> {
        let path = R::KIND.resource_path(id);
        let response = self
            .call(ApiRequest::new(Method::GET, path, Auth::Bearer(token.clone())))
            .await?;

        if response.status == 404 {
            return Err(AuraError::Api(ApiError::NotFound {
                kind: R::KIND.to_string(),
                id: id.to_string(),
            }));
        }
        if !response.is_success() {
            return Err(response.into_error());
        }

        let resource: R = decode::data(response.tree)?;
        debug!("Fetched {} {id}: {}", R::KIND, resource.status());
        Ok(resource)
    }

    /// Lists the resources of a kind owned by a tenant.
    ///
    /// # Errors
    ///
    /// Returns the decoded error on any non-success response.
    pub async fn list(
        &self,
        token: &AccessToken,
        kind: ResourceKind,
        tenant_id: &str,
    ) -> Result<Vec<ResourceSummary>> {
        let path = format!("{}?tenantId={tenant_id}", kind.collection_path());
        let summaries: Option<Vec<ResourceSummary>> = self.get(token, &path).await?;
        Ok(summaries.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::testing::MockTransport;
    use crate::aura::transport::RawResponse;
    use crate::error::ConfigError;
    use crate::aura::types::{Instance, ResourceStatus};

    fn client_with(status: u16, body: &'static str) -> AuraClient<MockTransport> {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(move |_| Ok(RawResponse::new(status, body)));
        AuraClient::new(transport)
    }

    #[test]
    fn test_from_config_validates_first() {
        let mut config = ProviderConfig::default();
        config.api.base_url = String::from("ftp://api.neo4j.io");
        let err = AuraClient::from_config(&config).unwrap_err();
        assert!(matches!(err, AuraError::Config(ConfigError::ValidationError { .. })));

        let mut config = ProviderConfig::default();
        config.polling.interval_secs = 0;
        assert!(AuraClient::from_config(&config).is_err());

        assert!(AuraClient::from_config(&ProviderConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_instance() {
        let client = client_with(200, r#"{"data": {"id": "db1", "name": "t1", "status": "running"}}"#);
        let instance: Instance = client.fetch(&AccessToken::new("t"), "db1").await.unwrap();
        assert_eq!(instance.status, ResourceStatus::Running);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let client = client_with(404, r#"{"errors": [{"message": "Not found", "reason": "not-found"}]}"#);
        let err = client
            .fetch::<Instance>(&AccessToken::new("t"), "db1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_single_message() {
        let client = client_with(
            403,
            r#"{"errors": [{"message": "Forbidden", "reason": "forbidden"}, {"message": "x"}]}"#,
        );
        let err = client
            .fetch::<Instance>(&AccessToken::new("t"), "db1")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "Aura API error: 403 - Forbidden");
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let client = client_with(502, "Bad Gateway\n");
        let err = client
            .fetch::<Instance>(&AccessToken::new("t"), "db1")
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("502 - Bad Gateway"));
    }

    #[tokio::test]
    async fn test_list_sends_tenant_query() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.method == Method::GET && request.path == "/v1/instances?tenantId=tenant"
            })
            .returning(|_| {
                Ok(RawResponse::new(
                    200,
                    r#"{"data": [{"id": "a", "name": "t1"}, {"id": "b", "name": "t2"}]}"#,
                ))
            });
        let client = AuraClient::new(transport);

        let listed = client
            .list(&AccessToken::new("t"), ResourceKind::Instance, "tenant")
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].name, "t2");
    }
}
