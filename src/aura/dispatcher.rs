//! Action dispatch.
//!
//! Submits one state-changing action and classifies the immediate answer as
//! accepted, benign conflict or hard failure. Dispatch never polls; waiting
//! for the action to finish belongs to the reconciler.

use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiError, AuraError, Result};

use super::client::AuraClient;
use super::decode;
use super::transport::{AccessToken, ApiRequest, Auth, Transport};
use super::types::{Resource, ResourceKind};

/// State-changing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a resource.
    Create,
    /// Delete a resource.
    Delete,
    /// Pause an instance.
    Pause,
    /// Resume a paused instance.
    Resume,
    /// Rename an instance.
    Rename,
    /// Resize or reconfigure an instance.
    Update,
}

impl Action {
    /// Action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Rename => "rename",
            Self::Update => "update",
        }
    }

    /// Progressive form, as the remote API words it in conflict messages.
    #[must_use]
    pub const fn progressive(self) -> &'static str {
        match self {
            Self::Create => "creating",
            Self::Delete => "deleting",
            Self::Pause => "pausing",
            Self::Resume => "resuming",
            Self::Rename => "renaming",
            Self::Update => "updating",
        }
    }

    /// HTTP verb and path for this action.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-create action has no resource id.
    pub fn route(self, kind: ResourceKind, id: Option<&str>) -> Result<(Method, String)> {
        if self == Self::Create {
            return Ok((Method::POST, kind.collection_path().to_string()));
        }

        let id = id.filter(|id| !id.is_empty()).ok_or_else(|| {
            AuraError::internal(format!("{} of a {kind} requires a resource id", self.as_str()))
        })?;
        let path = kind.resource_path(id);

        Ok(match self {
            Self::Delete => (Method::DELETE, path),
            Self::Pause | Self::Resume => (Method::POST, format!("{path}/{}", self.as_str())),
            Self::Create | Self::Rename | Self::Update => (Method::PATCH, path),
        })
    }

    /// Extra benign-conflict phrases beyond the generic "already ..." ones.
    const fn conflict_phrases(self) -> &'static [&'static str] {
        match self {
            Self::Pause => &["is not running", "already paused"],
            Self::Resume => &["is not paused", "already running"],
            Self::Update => &["already resizing", "currently undergoing an operation: resizing"],
            Self::Create | Self::Delete | Self::Rename => &[],
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if a 400/409 message means the action is already in progress
/// or already satisfied.
///
/// Creation conflicts are never benign: there is no resource id to re-read.
#[must_use]
pub fn is_benign_conflict(action: Action, message: &str) -> bool {
    if action == Action::Create {
        return false;
    }

    let message = message.to_ascii_lowercase();
    let progressive = action.progressive();

    message.contains(&format!("already {progressive}"))
        || message.contains(&format!("currently undergoing an operation: {progressive}"))
        || action
            .conflict_phrases()
            .iter()
            .any(|phrase| message.contains(phrase))
}

/// Classified outcome of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched<R> {
    /// The remote API accepted the action. Carries the response resource, if any.
    Accepted(Option<R>),
    /// The action was already in progress or satisfied. Carries the re-read resource.
    Conflict(R),
}

impl<R> Dispatched<R> {
    /// Returns true for a benign conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns the carried resource.
    #[must_use]
    pub fn into_resource(self) -> Option<R> {
        match self {
            Self::Accepted(resource) => resource,
            Self::Conflict(resource) => Some(resource),
        }
    }
}

impl<T: Transport> AuraClient<T> {
    /// Submits an action once and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] for non-benign 400/409 answers,
    /// [`ApiError::NotFound`] for 404 and [`ApiError::UnexpectedStatus`] for any
    /// other non-2xx status.
    pub async fn dispatch<R: Resource>(
        &self,
        token: &AccessToken,
        action: Action,
        id: Option<&str>,
        payload: Option<Value>,
    ) -> Result<Dispatched<R>> {
        let kind = R::KIND;
        let (method, path) = action.route(kind, id)?;
        let target = id.unwrap_or("(new)");

        let mut request = ApiRequest::new(method, path, Auth::Bearer(token.clone()));
        if let Some(payload) = payload {
            request = request.with_body(payload);
        }

        info!("Submitting {action} for {kind} {target}");
        let response = self.call(request).await?;

        match response.status {
            200..=299 if !decode::has_errors(&response.tree) => {
                if response.tree.is_null() {
                    return Ok(Dispatched::Accepted(None));
                }
                let resource: Option<R> = decode::data(response.tree)?;
                Ok(Dispatched::Accepted(resource))
            }
            400 | 409 => {
                let message = response.error_message();
                match id {
                    Some(id) if is_benign_conflict(action, &message) => {
                        warn!("{action} of {kind} {id} conflicts benignly: {message}");
                        let current = self.fetch::<R>(token, id).await?;
                        Ok(Dispatched::Conflict(current))
                    }
                    _ => Err(AuraError::Api(ApiError::api_error(response.status, message))),
                }
            }
            404 => Err(AuraError::Api(ApiError::NotFound {
                kind: kind.to_string(),
                id: target.to_string(),
            })),
            status => Err(AuraError::Api(ApiError::UnexpectedStatus {
                status,
                operation: format!(
                    "{} {kind} {target}: {}",
                    action.progressive(),
                    response.error_message()
                ),
            })),
        }
    }

    /// Fails if the tenant already owns a resource of this kind with this name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DuplicateName`] on a clash, or the listing error.
    pub async fn ensure_name_available(
        &self,
        token: &AccessToken,
        kind: ResourceKind,
        tenant_id: &str,
        name: &str,
    ) -> Result<()> {
        let existing = self.list(token, kind, tenant_id).await?;

        if existing.iter().any(|resource| resource.name == name) {
            return Err(AuraError::Api(ApiError::DuplicateName {
                kind: kind.to_string(),
                name: name.to_string(),
            }));
        }

        Ok(())
    }
}
