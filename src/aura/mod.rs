//! Aura API integration module.
//!
//! This module provides everything below the reconciler: the HTTP transport,
//! the response decoder, typed resources, action dispatch, the token exchange
//! and the read-only lookups.

mod auth;
mod client;
pub mod decode;
mod dispatcher;
mod lookups;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::TOKEN_PATH;
pub use client::{ApiResponse, AuraClient};
pub use decode::{ErrorDetail, ErrorEnvelope};
pub use dispatcher::{Action, Dispatched, is_benign_conflict};
pub use lookups::SIZING_PATH;
pub use transport::{AccessToken, ApiRequest, Auth, HttpSettings, HttpTransport, RawResponse, Transport};
pub use types::{
    CreateInstanceRequest, CreateKeyRequest, CustomerManagedKey, Instance, InstanceConfiguration,
    InstanceFlag, InstanceUpdate, Resource, ResourceKind, ResourceStatus, ResourceSummary,
    SizingEstimate, SizingRequest, Tenant,
};
