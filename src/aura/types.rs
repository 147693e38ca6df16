//! Aura API types and data structures.
//!
//! Each endpoint gets a typed view; the decoder's number normalization runs
//! before any of these are deserialized.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::decode::{lenient_bool, lenient_i64};

/// The kinds of resource the reconciler manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A graph-database instance.
    Instance,
    /// A customer-managed encryption key.
    CustomerManagedKey,
}

impl ResourceKind {
    /// Collection path of this kind.
    #[must_use]
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Instance => "/v1/instances",
            Self::CustomerManagedKey => "/v1/customer-managed-keys",
        }
    }

    /// Human-readable name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::CustomerManagedKey => "cmk",
        }
    }

    /// Path of a single resource of this kind.
    #[must_use]
    pub fn resource_path(self, id: &str) -> String {
        format!("{}/{id}", self.collection_path())
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by the remote API.
///
/// Unrecognized values are kept verbatim in [`ResourceStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    /// Being created.
    Creating,
    /// Instance is up and serving.
    Running,
    /// Pause in progress.
    Pausing,
    /// Instance is paused.
    Paused,
    /// Resume in progress.
    Resuming,
    /// Resume restoring data.
    Restoring,
    /// Configuration change in progress.
    Updating,
    /// Memory resize in progress.
    Resizing,
    /// Deletion in progress.
    Deleting,
    /// Resources being torn down.
    Destroying,
    /// Key awaiting activation.
    Pending,
    /// Key is usable.
    Ready,
    /// No status was reported.
    #[default]
    Unknown,
    /// Any other status string.
    Other(String),
}

impl ResourceStatus {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "creating",
            Self::Running => "running",
            Self::Pausing => "pausing",
            Self::Paused => "paused",
            Self::Resuming => "resuming",
            Self::Restoring => "restoring",
            Self::Updating => "updating",
            Self::Resizing => "resizing",
            Self::Deleting => "deleting",
            Self::Destroying => "destroying",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Unknown => "",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for ResourceStatus {
    fn from(status: String) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "creating" => Self::Creating,
            "running" => Self::Running,
            "pausing" => Self::Pausing,
            "paused" => Self::Paused,
            "resuming" => Self::Resuming,
            "restoring" => Self::Restoring,
            "updating" => Self::Updating,
            "resizing" => Self::Resizing,
            "deleting" => Self::Deleting,
            "destroying" => Self::Destroying,
            "pending" => Self::Pending,
            "ready" => Self::Ready,
            "" => Self::Unknown,
            _ => Self::Other(status),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A remote resource whose status can be polled.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Kind of this resource.
    const KIND: ResourceKind;

    /// Resource identifier.
    fn id(&self) -> &str;

    /// Current status.
    fn status(&self) -> &ResourceStatus;
}

/// A graph-database instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance identifier.
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Current status.
    #[serde(default)]
    pub status: ResourceStatus,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Cloud provider (gcp, aws, azure).
    #[serde(default)]
    pub cloud_provider: Option<String>,
    /// Cloud region.
    #[serde(default)]
    pub region: Option<String>,
    /// Instance type (e.g. enterprise-db).
    #[serde(default, rename = "type")]
    pub instance_type: Option<String>,
    /// Memory size, absent while paused.
    #[serde(default)]
    pub memory: Option<String>,
    /// Storage size, absent while paused.
    #[serde(default)]
    pub storage: Option<String>,
    /// Bolt connection URL, absent while paused.
    #[serde(default)]
    pub connection_url: Option<String>,
    /// Number of secondaries.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub secondaries_count: Option<i64>,
    /// Change data capture mode.
    #[serde(default)]
    pub cdc_enrichment_mode: Option<String>,
    /// Whether vector optimization is enabled.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub vector_optimized: Option<bool>,
    /// Whether the graph analytics plugin is installed.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub graph_analytics_plugin: Option<bool>,
    /// Encryption key protecting the instance.
    #[serde(default)]
    pub customer_managed_key_id: Option<String>,
    /// Default database user, returned on creation.
    #[serde(default)]
    pub username: Option<String>,
    /// Default database password, returned on creation only.
    #[serde(default)]
    pub password: Option<String>,
}

impl Instance {
    /// Returns true if the instance is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self.status, ResourceStatus::Paused)
    }

    /// Returns the connection URL if one is populated.
    #[must_use]
    pub fn connection_url(&self) -> Option<&str> {
        self.connection_url.as_deref().filter(|url| !url.is_empty())
    }
}

impl Resource for Instance {
    const KIND: ResourceKind = ResourceKind::Instance;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// A customer-managed encryption key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerManagedKey {
    /// Key identifier.
    pub id: String,
    /// Key name.
    #[serde(default)]
    pub name: String,
    /// Current status.
    #[serde(default)]
    pub status: ResourceStatus,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Cloud provider.
    #[serde(default)]
    pub cloud_provider: Option<String>,
    /// Cloud region.
    #[serde(default)]
    pub region: Option<String>,
    /// Instance type the key may protect.
    #[serde(default)]
    pub instance_type: Option<String>,
    /// Provider-side key identifier (ARN, URI).
    #[serde(default)]
    pub key_id: Option<String>,
}

impl Resource for CustomerManagedKey {
    const KIND: ResourceKind = ResourceKind::CustomerManagedKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> &ResourceStatus {
        &self.status
    }
}

/// Entry of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceSummary {
    /// Resource identifier.
    pub id: String,
    /// Resource name.
    #[serde(default)]
    pub name: String,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Request to create an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInstanceRequest {
    /// Neo4j version.
    pub version: String,
    /// Cloud region.
    pub region: String,
    /// Memory size (e.g. "8GB").
    pub memory: String,
    /// Instance name.
    pub name: String,
    /// Instance type.
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Cloud provider.
    pub cloud_provider: String,
    /// Encryption key to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_managed_key_id: Option<String>,
    /// Enable vector optimization.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub vector_optimized: bool,
    /// Install the graph analytics plugin.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub graph_analytics_plugin: bool,
    /// Pause the instance once it is running.
    #[serde(skip)]
    pub paused: bool,
    /// Secondaries to add once the instance is running.
    #[serde(skip)]
    pub secondaries_count: i64,
}

impl CreateInstanceRequest {
    /// Creates a request with Aura's usual defaults (Neo4j 5, 8GB enterprise on GCP).
    #[must_use]
    pub fn new(name: &str, tenant_id: &str) -> Self {
        Self {
            version: String::from("5"),
            region: String::from("europe-west1"),
            memory: String::from("8GB"),
            name: name.to_string(),
            instance_type: String::from("enterprise-db"),
            tenant_id: tenant_id.to_string(),
            cloud_provider: String::from("gcp"),
            customer_managed_key_id: None,
            vector_optimized: false,
            graph_analytics_plugin: false,
            paused: false,
            secondaries_count: 0,
        }
    }

    /// Sets the cloud provider and region.
    #[must_use]
    pub fn with_placement(mut self, cloud_provider: &str, region: &str) -> Self {
        self.cloud_provider = cloud_provider.to_string();
        self.region = region.to_string();
        self
    }

    /// Sets the instance type.
    #[must_use]
    pub fn with_type(mut self, instance_type: &str) -> Self {
        self.instance_type = instance_type.to_string();
        self
    }

    /// Sets the memory size.
    #[must_use]
    pub fn with_memory(mut self, memory: &str) -> Self {
        self.memory = memory.to_string();
        self
    }

    /// Sets the Neo4j version.
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Protects the instance with a customer-managed key.
    #[must_use]
    pub fn with_customer_managed_key(mut self, key_id: &str) -> Self {
        self.customer_managed_key_id = Some(key_id.to_string());
        self
    }

    /// Enables vector optimization.
    #[must_use]
    pub const fn with_vector_optimized(mut self, enabled: bool) -> Self {
        self.vector_optimized = enabled;
        self
    }

    /// Installs the graph analytics plugin.
    #[must_use]
    pub const fn with_graph_analytics_plugin(mut self, enabled: bool) -> Self {
        self.graph_analytics_plugin = enabled;
        self
    }

    /// Pauses the instance after creation.
    #[must_use]
    pub const fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Adds secondaries after creation.
    #[must_use]
    pub const fn with_secondaries(mut self, count: i64) -> Self {
        self.secondaries_count = count;
        self
    }
}

/// Request to create a customer-managed key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateKeyRequest {
    /// Key name.
    pub name: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Cloud region.
    pub region: String,
    /// Instance type the key may protect.
    pub instance_type: String,
    /// Cloud provider.
    pub cloud_provider: String,
    /// Provider-side key identifier.
    pub key_id: String,
}

impl CreateKeyRequest {
    /// Creates a request for an enterprise-db key on GCP.
    #[must_use]
    pub fn new(name: &str, tenant_id: &str, key_id: &str) -> Self {
        Self {
            name: name.to_string(),
            tenant_id: tenant_id.to_string(),
            region: String::from("europe-west1"),
            instance_type: String::from("enterprise-db"),
            cloud_provider: String::from("gcp"),
            key_id: key_id.to_string(),
        }
    }

    /// Sets the cloud provider and region.
    #[must_use]
    pub fn with_placement(mut self, cloud_provider: &str, region: &str) -> Self {
        self.cloud_provider = cloud_provider.to_string();
        self.region = region.to_string();
        self
    }

    /// Sets the instance type.
    #[must_use]
    pub fn with_instance_type(mut self, instance_type: &str) -> Self {
        self.instance_type = instance_type.to_string();
        self
    }
}

/// Boolean or enumerated instance settings changed in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFlag {
    /// Vector optimization on or off.
    VectorOptimized(bool),
    /// Graph analytics plugin installed or removed.
    GraphAnalyticsPlugin(bool),
    /// Change data capture mode (OFF, DIFF, FULL).
    CdcEnrichmentMode(String),
}

/// PATCH payload for an instance; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New memory size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// New number of secondaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondaries_count: Option<i64>,
    /// Vector optimization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_optimized: Option<bool>,
    /// Graph analytics plugin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_analytics_plugin: Option<bool>,
    /// Change data capture mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdc_enrichment_mode: Option<String>,
}

impl InstanceUpdate {
    /// Rename only.
    #[must_use]
    pub fn rename(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Memory resize only.
    #[must_use]
    pub fn memory(memory: &str) -> Self {
        Self {
            memory: Some(memory.to_string()),
            ..Self::default()
        }
    }

    /// Secondary count only.
    #[must_use]
    pub fn secondaries(count: i64) -> Self {
        Self {
            secondaries_count: Some(count),
            ..Self::default()
        }
    }

    /// A single flag.
    #[must_use]
    pub fn flag(flag: InstanceFlag) -> Self {
        match flag {
            InstanceFlag::VectorOptimized(enabled) => Self {
                vector_optimized: Some(enabled),
                ..Self::default()
            },
            InstanceFlag::GraphAnalyticsPlugin(enabled) => Self {
                graph_analytics_plugin: Some(enabled),
                ..Self::default()
            },
            InstanceFlag::CdcEnrichmentMode(mode) => Self {
                cdc_enrichment_mode: Some(mode),
                ..Self::default()
            },
        }
    }

    /// Returns true if the update changes more than the name.
    ///
    /// Renames apply synchronously; every other change is carried out
    /// asynchronously by the remote service.
    #[must_use]
    pub const fn changes_configuration(&self) -> bool {
        self.memory.is_some()
            || self.secondaries_count.is_some()
            || self.vector_optimized.is_some()
            || self.graph_analytics_plugin.is_some()
            || self.cdc_enrichment_mode.is_some()
    }

    /// Returns true if nothing would be changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.memory.is_none()
            && self.secondaries_count.is_none()
            && self.vector_optimized.is_none()
            && self.graph_analytics_plugin.is_none()
            && self.cdc_enrichment_mode.is_none()
    }
}

/// Sizing estimator input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizingRequest {
    /// Expected node count.
    pub node_count: i64,
    /// Expected relationship count.
    pub relationship_count: i64,
    /// Instance type.
    pub instance_type: String,
    /// Graph algorithm categories to be run.
    pub algorithm_categories: Vec<String>,
}

/// Sizing estimator result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SizingEstimate {
    /// Whether the estimate exceeds the largest size on offer.
    #[serde(default)]
    pub did_exceed_maximum: bool,
    /// Recommended memory size.
    #[serde(default)]
    pub recommended_size: String,
    /// Minimum memory required.
    #[serde(default)]
    pub min_required_memory: String,
}

/// A tenant (project) and the configurations it may create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: String,
    /// Tenant name.
    #[serde(default)]
    pub name: String,
    /// Instance configurations available to the tenant.
    #[serde(default)]
    pub instance_configurations: Vec<InstanceConfiguration>,
}

/// One instance configuration offered to a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceConfiguration {
    /// Cloud provider.
    #[serde(default)]
    pub cloud_provider: String,
    /// Memory size.
    #[serde(default)]
    pub memory: String,
    /// Region code.
    #[serde(default)]
    pub region: String,
    /// Region display name.
    #[serde(default)]
    pub region_name: String,
    /// Storage size.
    #[serde(default)]
    pub storage: String,
    /// Instance type.
    #[serde(default, rename = "type")]
    pub instance_type: String,
    /// Neo4j version.
    #[serde(default)]
    pub version: String,
}
