//! OAuth client-credentials token exchange.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Credentials;
use crate::error::{ApiError, AuraError, Result};

use super::client::AuraClient;
use super::transport::{AccessToken, ApiRequest, Auth, Transport};

/// Token endpoint path.
pub const TOKEN_PATH: &str = "/oauth/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl<T: Transport> AuraClient<T> {
    /// Exchanges client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthenticationFailed`] if the exchange is rejected.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken> {
        let request = ApiRequest::new(
            Method::POST,
            TOKEN_PATH,
            Auth::Basic {
                client_id: credentials.client_id.clone(),
                client_secret: credentials.client_secret.clone(),
            },
        )
        .with_body(json!({"grant_type": "client_credentials"}));

        let response = self.call(request).await?;
        if response.status != 200 {
            return Err(AuraError::Api(ApiError::AuthenticationFailed {
                status: response.status,
                message: response.error_message(),
            }));
        }

        let token: TokenResponse = serde_json::from_value(response.tree).map_err(|e| {
            ApiError::invalid_response(format!("Token response without access_token: {e}"))
        })?;
        if token.access_token.is_empty() {
            return Err(AuraError::Api(ApiError::invalid_response(
                "Token response carried an empty access_token",
            )));
        }

        debug!("Token expires in {:?}s", token.expires_in);
        info!("Authenticated client {}", credentials.client_id);
        Ok(AccessToken::new(token.access_token))
    }
}
