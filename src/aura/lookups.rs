//! Read-only lookups: sizing estimates and tenant configurations.

use serde_json::Value;
use tracing::debug;

use crate::config::validate_tenant_id;
use crate::error::{ApiError, Result};

use super::client::AuraClient;
use super::transport::{AccessToken, Transport};
use super::types::{SizingEstimate, SizingRequest, Tenant};

/// Sizing estimator path.
pub const SIZING_PATH: &str = "/v1/instances/sizing";

impl<T: Transport> AuraClient<T> {
    /// Estimates the memory an instance needs for a graph of the given size.
    ///
    /// # Errors
    ///
    /// Returns the decoded error envelope on a non-success response.
    pub async fn estimate_sizing(
        &self,
        token: &AccessToken,
        request: &SizingRequest,
    ) -> Result<SizingEstimate> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::invalid_response(format!("Unserializable sizing request: {e}")))?;
        let estimate: SizingEstimate = self.post(token, SIZING_PATH, body).await?;
        debug!(
            "Sizing for {} nodes: recommended {}",
            request.node_count, estimate.recommended_size
        );
        Ok(estimate)
    }

    /// Fetches a tenant and the instance configurations it may create.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is not a UUID or the request fails.
    pub async fn tenant(&self, token: &AccessToken, tenant_id: &str) -> Result<Tenant> {
        validate_tenant_id(tenant_id)?;
        self.get(token, &format!("/v1/tenants/{tenant_id}")).await
    }

    /// Raw variant of [`AuraClient::tenant`] for callers rendering their own shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is not a UUID or the request fails.
    pub async fn tenant_tree(&self, token: &AccessToken, tenant_id: &str) -> Result<Value> {
        validate_tenant_id(tenant_id)?;
        self.get(token, &format!("/v1/tenants/{tenant_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::testing::{MockTransport, error_response, json_response};
    use serde_json::json;

    const TENANT: &str = "6a2f1c4e-0b7d-4c59-9c1e-2f0d8e3b5a71";

    #[tokio::test]
    async fn test_sizing_estimate() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.path == SIZING_PATH
                    && request.body.as_ref().is_some_and(|body| body["node_count"] == 9_000_000_000_i64)
            })
            .returning(|_| {
                Ok(json_response(
                    200,
                    &json!({"data": {"did_exceed_maximum": false, "recommended_size": "16GB",
                        "min_required_memory": "8GB"}}),
                ))
            });

        let estimate = AuraClient::new(transport)
            .estimate_sizing(
                &AccessToken::new("t"),
                &SizingRequest {
                    node_count: 9_000_000_000,
                    relationship_count: 20_000_000_000,
                    instance_type: String::from("enterprise-ds"),
                    algorithm_categories: vec![String::from("graph-structure")],
                },
            )
            .await
            .unwrap();
        assert_eq!(estimate.recommended_size, "16GB");
        assert!(!estimate.did_exceed_maximum);
    }

    #[tokio::test]
    async fn test_tenant_configurations() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| request.path == format!("/v1/tenants/{TENANT}"))
            .returning(|_| {
                Ok(json_response(
                    200,
                    &json!({"data": {"id": TENANT, "name": "prod", "instance_configurations": [
                        {"cloud_provider": "gcp", "memory": "8GB", "region": "europe-west1",
                         "region_name": "Belgium", "storage": "16GB", "type": "enterprise-db",
                         "version": "5"}
                    ]}}),
                ))
            });

        let tenant = AuraClient::new(transport)
            .tenant(&AccessToken::new("t"), TENANT)
            .await
            .unwrap();
        assert_eq!(tenant.name, "prod");
        assert_eq!(tenant.instance_configurations[0].instance_type, "enterprise-db");
    }

    #[tokio::test]
    async fn test_tenant_rejects_non_uuid_without_request() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let result = AuraClient::new(transport)
            .tenant(&AccessToken::new("t"), "prod")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tenant_error_surfaces_message() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(error_response(403, "Access denied")));

        let err = AuraClient::new(transport)
            .tenant(&AccessToken::new("t"), TENANT)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("Access denied"));
    }
}
