//! Stateful fake of the Aura API for integration tests.
//!
//! Every status fetch advances the resource one step along a scripted path,
//! so tests observe the same intermediate statuses the real service reports.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aura_reconciler::aura::HttpSettings;
use aura_reconciler::{AuraClient, CompletionPoller, HttpTransport, PollConfig, ResourceOperations};
use serde_json::{Value, json};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Tenant owning every fake resource.
pub const TENANT: &str = "6a2f1c4e-0b7d-4c59-9c1e-2f0d8e3b5a71";

/// Bearer token the fake accepts.
pub const TOKEN: &str = "fake-token";

const GONE: &str = "<gone>";

/// Fast transport settings against a local server.
pub fn http_settings(base_url: &str) -> HttpSettings {
    HttpSettings {
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(2),
        max_attempts: 3,
        retry_delay: Duration::from_millis(10),
    }
}

/// Millisecond polling with the usual two warm-up ticks.
pub fn poll_config() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        warmup_ticks: 2,
        warmup_delay: Duration::from_millis(10),
        settle_delay: Duration::from_millis(10),
    }
}

#[derive(Debug)]
struct FakeResource {
    id: String,
    name: String,
    tenant_id: String,
    memory: String,
    key_id: Option<String>,
    status: String,
    script: VecDeque<String>,
    served: Vec<String>,
}

impl FakeResource {
    fn follow(&mut self, now: &str, then: &[&str]) {
        self.status = now.to_string();
        self.script = then.iter().map(ToString::to_string).collect();
    }

    fn advance(&mut self) {
        if let Some(next) = self.script.pop_front() {
            self.status = next;
        }
        self.served.push(self.status.clone());
    }

    fn settled(&self) -> String {
        self.script
            .back()
            .cloned()
            .unwrap_or_else(|| self.status.clone())
    }

    fn to_json(&self) -> Value {
        match &self.key_id {
            Some(key_id) => json!({
                "id": self.id,
                "name": self.name,
                "status": self.status,
                "tenant_id": self.tenant_id,
                "cloud_provider": "aws",
                "region": "eu-west-1",
                "instance_type": "enterprise-db",
                "key_id": key_id,
            }),
            None => json!({
                "id": self.id,
                "name": self.name,
                "status": self.status,
                "tenant_id": self.tenant_id,
                "cloud_provider": "gcp",
                "region": "europe-west1",
                "type": "enterprise-db",
                "memory": self.memory,
                "secondaries_count": 0,
                "connection_url": (self.status == "running")
                    .then(|| format!("neo4j+s://{}.databases.neo4j.io", self.id)),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    resources: HashMap<String, FakeResource>,
    created: u32,
}

#[derive(Clone, Default)]
struct FakeApi {
    state: Arc<Mutex<State>>,
}

fn data(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"data": body}))
}

fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(json!({"errors": [{"message": message, "reason": "fake"}]}))
}

impl FakeApi {
    fn handle(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let method = request.method.as_str();
        let authorization = request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if segments == ["oauth", "token"] {
            return if authorization.starts_with("Basic ") {
                ResponseTemplate::new(200).set_body_json(
                    json!({"access_token": TOKEN, "expires_in": 3600, "token_type": "bearer"}),
                )
            } else {
                ResponseTemplate::new(401).set_body_string("invalid client")
            };
        }
        if authorization != format!("Bearer {TOKEN}") {
            return error(401, "Unauthorized");
        }

        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut state = self.state.lock().unwrap();

        match (method, segments.as_slice()) {
            ("GET", ["v1", collection]) => {
                let is_key = *collection == "customer-managed-keys";
                let listed: Vec<Value> = state
                    .resources
                    .values()
                    .filter(|r| r.key_id.is_some() == is_key && r.status != GONE)
                    .map(|r| json!({"id": r.id, "name": r.name, "tenant_id": r.tenant_id}))
                    .collect();
                data(200, Value::Array(listed))
            }
            ("POST", ["v1", collection]) => {
                state.created += 1;
                let is_key = *collection == "customer-managed-keys";
                let id = format!("{}-{}", if is_key { "key" } else { "db" }, state.created);
                let mut resource = FakeResource {
                    id: id.clone(),
                    name: body["name"].as_str().unwrap_or_default().to_string(),
                    tenant_id: body["tenant_id"].as_str().unwrap_or_default().to_string(),
                    memory: body["memory"].as_str().unwrap_or_default().to_string(),
                    key_id: is_key.then(|| body["key_id"].as_str().unwrap_or_default().to_string()),
                    status: String::new(),
                    script: VecDeque::new(),
                    served: Vec::new(),
                };
                let created = if is_key {
                    resource.follow("pending", &["pending", "pending", "ready"]);
                    resource.to_json()
                } else {
                    resource.follow("creating", &["creating", "creating", "running"]);
                    let mut created = resource.to_json();
                    created["username"] = json!("neo4j");
                    created["password"] = json!("initial-password");
                    created
                };
                state.resources.insert(id, resource);
                data(202, created)
            }
            (_, ["v1", _, id, rest @ ..]) => {
                let Some(resource) = state.resources.get_mut(*id) else {
                    return error(404, "Resource not found");
                };
                if resource.status == GONE {
                    return error(404, "Resource not found");
                }
                Self::act(resource, method, rest, &body)
            }
            _ => error(404, "No such route"),
        }
    }

    fn act(resource: &mut FakeResource, method: &str, rest: &[&str], body: &Value) -> ResponseTemplate {
        match (method, rest) {
            ("GET", []) => {
                resource.advance();
                if resource.status == GONE {
                    return error(404, "Resource not found");
                }
                data(200, resource.to_json())
            }
            ("DELETE", []) => {
                if resource.status == "deleting" {
                    return error(409, "Instance is already deleting");
                }
                resource.follow("deleting", &["deleting", "destroying", GONE]);
                data(202, resource.to_json())
            }
            ("POST", ["pause"]) => match resource.status.as_str() {
                "pausing" => error(409, "Instance is already pausing"),
                "running" => {
                    resource.follow("pausing", &["pausing", "pausing", "paused"]);
                    data(202, resource.to_json())
                }
                _ => error(400, &format!("Instance {} is not running", resource.id)),
            },
            ("POST", ["resume"]) => match resource.status.as_str() {
                "paused" => {
                    resource.follow("resuming", &["resuming", "restoring", "running"]);
                    data(202, resource.to_json())
                }
                _ => error(400, &format!("Instance {} is not paused", resource.id)),
            },
            ("PATCH", []) => {
                if let Some(name) = body["name"].as_str() {
                    resource.name = name.to_string();
                }
                if let Some(memory) = body["memory"].as_str() {
                    let settled = resource.settled();
                    resource.memory = memory.to_string();
                    // The first poll after the PATCH still sees the old status.
                    resource.follow(&settled, &[settled.as_str(), "resizing", "resizing", settled.as_str()]);
                } else if body.get("vector_optimized").is_some() {
                    let settled = resource.settled();
                    resource.follow(&settled, &[settled.as_str(), "updating", settled.as_str()]);
                }
                data(200, resource.to_json())
            }
            _ => error(405, "Method not allowed"),
        }
    }
}

impl Respond for FakeApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.handle(request)
    }
}

/// A running fake API server.
pub struct FakeAura {
    /// The underlying mock server.
    pub server: MockServer,
    api: FakeApi,
}

impl FakeAura {
    /// Starts a fresh fake with no resources.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let api = FakeApi::default();
        Mock::given(any())
            .respond_with(api.clone())
            .mount(&server)
            .await;
        Self { server, api }
    }

    /// HTTP client pointed at the fake.
    pub fn client(&self) -> AuraClient<HttpTransport> {
        AuraClient::new(HttpTransport::new(http_settings(&self.server.uri())).unwrap())
    }

    /// Resource operations pointed at the fake.
    pub fn operations(&self) -> ResourceOperations<HttpTransport> {
        ResourceOperations::new(self.client(), CompletionPoller::new(poll_config()))
    }

    /// Statuses served for a resource, in order.
    pub fn served(&self, id: &str) -> Vec<String> {
        self.api
            .state
            .lock()
            .unwrap()
            .resources
            .get(id)
            .map(|resource| resource.served.clone())
            .unwrap_or_default()
    }

    /// Number of requests received with the given method.
    pub async fn count(&self, method: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == method)
            .count()
    }
}
