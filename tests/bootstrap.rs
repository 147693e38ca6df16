//! Configuration, token exchange and read-only lookups end to end.

mod common;

use std::io::Write;

use aura_reconciler::aura::{SizingRequest, TOKEN_PATH};
use aura_reconciler::{AccessToken, AuraClient, ConfigParser, ConfigValidator, Credentials};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_token_exchange_against_fake() {
    let fake = common::FakeAura::start().await;
    let client = fake.client();

    let token = client
        .authenticate(&Credentials {
            client_id: String::from("client"),
            client_secret: String::from("secret"),
        })
        .await
        .unwrap();

    assert_eq!(token.secret(), common::TOKEN);
}

#[tokio::test]
async fn test_config_file_drives_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header_exists("authorization"))
        .and(body_json(json!({"grant_type": "client_credentials"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "api:\n  base_url: {}\n  request_timeout_secs: 5\ncredentials:\n  client_id: client\n  client_secret: secret",
        server.uri()
    )
    .unwrap();

    let config = ConfigParser::new().load_file(file.path()).unwrap();
    ConfigValidator::new().validate(&config).unwrap();
    let credentials = ConfigParser::credentials(&config).unwrap();

    let token = AuraClient::from_config(&config)
        .unwrap()
        .authenticate(&credentials)
        .await
        .unwrap();
    assert_eq!(token.secret(), "abc");
}

#[tokio::test]
async fn test_sizing_and_tenant_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/instances/sizing"))
        .and(bearer_token("abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
            "did_exceed_maximum": true,
            "recommended_size": "384GB",
            "min_required_memory": "512GB"
        }})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/tenants/{}", common::TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
            "id": common::TENANT,
            "name": "production",
            "instance_configurations": [
                {"cloud_provider": "gcp", "memory": "8GB", "region": "europe-west1",
                 "region_name": "Belgium (europe-west1)", "storage": "16GB",
                 "type": "enterprise-db", "version": "5"},
                {"cloud_provider": "aws", "memory": "16GB", "region": "eu-west-1",
                 "region_name": "Ireland", "storage": "32GB",
                 "type": "enterprise-ds", "version": "5"}
            ]
        }})))
        .mount(&server)
        .await;

    let client = AuraClient::new(
        aura_reconciler::HttpTransport::new(common::http_settings(&server.uri())).unwrap(),
    );
    let token = AccessToken::new("abc");

    let estimate = client
        .estimate_sizing(
            &token,
            &SizingRequest {
                node_count: 4_000_000_000,
                relationship_count: 9_007_199_254_740_993,
                instance_type: String::from("enterprise-ds"),
                algorithm_categories: vec![String::from("node-embedding")],
            },
        )
        .await
        .unwrap();
    assert!(estimate.did_exceed_maximum);
    assert_eq!(estimate.min_required_memory, "512GB");

    let tenant = client.tenant(&token, common::TENANT).await.unwrap();
    assert_eq!(tenant.instance_configurations.len(), 2);
    assert_eq!(tenant.instance_configurations[1].region_name, "Ireland");
}
