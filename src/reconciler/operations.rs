//! Resource operations.
//!
//! Each operation composes the dispatcher and the completion poller into one
//! blocking call. An error from any of them means the outcome is unknown:
//! callers re-read the resource before retrying.

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aura::{
    AccessToken, Action, AuraClient, CreateInstanceRequest, CreateKeyRequest, CustomerManagedKey,
    Dispatched, HttpTransport, Instance, InstanceFlag, InstanceUpdate, Resource, Transport,
};
use crate::config::{ProviderConfig, validate_tenant_id};
use crate::error::{ApiError, AuraError, ConfigError, Result};

use super::completion;
use super::poller::{CompletionPoller, PollConfig};

/// Lifecycle operations on instances and customer-managed keys.
#[derive(Debug)]
pub struct ResourceOperations<T = HttpTransport> {
    /// API client.
    client: AuraClient<T>,
    /// Completion poller.
    poller: CompletionPoller,
}

impl ResourceOperations<HttpTransport> {
    /// Creates HTTP-backed operations from a validated provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self::new(
            AuraClient::from_config(config)?,
            CompletionPoller::new(PollConfig::from(&config.polling)),
        ))
    }
}

impl<T: Transport> ResourceOperations<T> {
    /// Creates operations over a client and a poller.
    #[must_use]
    pub const fn new(client: AuraClient<T>, poller: CompletionPoller) -> Self {
        Self { client, poller }
    }

    /// Returns the API client.
    #[must_use]
    pub const fn client(&self) -> &AuraClient<T> {
        &self.client
    }

    /// Creates an instance and waits until it is running.
    ///
    /// Fails before submitting if the tenant already has an instance with the
    /// same name. When requested, the new instance is then paused and given
    /// secondaries, each waited for in turn. The initial password, only
    /// returned on creation, is carried onto the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is invalid, the name is taken, or any
    /// step fails or times out.
    pub async fn create_instance(
        &self,
        token: &AccessToken,
        request: &CreateInstanceRequest,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        validate_tenant_id(&request.tenant_id)?;
        self.client
            .ensure_name_available(token, Instance::KIND, &request.tenant_id, &request.name)
            .await?;

        let created: Instance = self.submit_create(token, request).await?;
        info!("Instance {} created as {}", request.name, created.id);

        let mut instance: Instance = self.wait(token, Action::Create, &created.id, cancel).await?;
        carry_credentials(&mut instance, &created);

        if request.paused {
            instance = self.pause_instance(token, &created.id, true, cancel).await?;
            carry_credentials(&mut instance, &created);
        }

        if request.secondaries_count > 0 {
            instance = self
                .update_secondaries(token, &created.id, request.secondaries_count, cancel)
                .await?;
            carry_credentials(&mut instance, &created);
        }

        Ok(instance)
    }

    /// Deletes an instance and waits until it is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected or does not finish in time.
    pub async fn delete_instance(
        &self,
        token: &AccessToken,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.delete::<Instance>(token, id, cancel).await
    }

    /// Pauses an instance, optionally waiting until it is paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the pause is rejected or does not finish in time.
    pub async fn pause_instance(
        &self,
        token: &AccessToken,
        id: &str,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        self.transition(token, Action::Pause, id, wait, cancel).await
    }

    /// Resumes an instance, optionally waiting until it is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the resume is rejected or does not finish in time.
    pub async fn resume_instance(
        &self,
        token: &AccessToken,
        id: &str,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        self.transition(token, Action::Resume, id, wait, cancel).await
    }

    /// Renames an instance. Renames apply synchronously; nothing is polled.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename is rejected.
    pub async fn rename_instance(
        &self,
        token: &AccessToken,
        id: &str,
        name: &str,
    ) -> Result<Instance> {
        let payload = to_payload(&InstanceUpdate::rename(name))?;
        let outcome = self
            .client
            .dispatch::<Instance>(token, Action::Rename, Some(id), Some(payload))
            .await?;

        match outcome.into_resource() {
            Some(instance) => Ok(instance),
            None => self.client.fetch(token, id).await,
        }
    }

    /// Changes an instance's memory size and waits for the resize to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize is rejected or does not finish in time.
    pub async fn resize_memory(
        &self,
        token: &AccessToken,
        id: &str,
        memory: &str,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        self.update_instance(token, id, &InstanceUpdate::memory(memory), cancel)
            .await
    }

    /// Changes one instance flag and waits for the change to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the change is rejected or does not finish in time.
    pub async fn update_flag(
        &self,
        token: &AccessToken,
        id: &str,
        flag: InstanceFlag,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        self.update_instance(token, id, &InstanceUpdate::flag(flag), cancel)
            .await
    }

    /// Changes the number of secondaries and waits for the change to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the change is rejected or does not finish in time.
    pub async fn update_secondaries(
        &self,
        token: &AccessToken,
        id: &str,
        count: i64,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        self.update_instance(token, id, &InstanceUpdate::secondaries(count), cancel)
            .await
    }

    /// Applies an arbitrary update with a single PATCH.
    ///
    /// Waits only when the update changes more than the name. The wait requires
    /// the instance to leave its settled status before accepting it again, so
    /// a poll that still sees the pre-update status cannot end it early. The
    /// other side of that rule: a PATCH that changes nothing, or a change that
    /// finishes entirely between two polls, is never seen in transit and runs
    /// until the polling budget is spent. [`Self::apply_changes`] skips fields
    /// that already hold their value.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is empty, rejected, or does not finish in time.
    pub async fn update_instance(
        &self,
        token: &AccessToken,
        id: &str,
        update: &InstanceUpdate,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        if update.is_empty() {
            return Err(AuraError::Config(ConfigError::validation(
                "Instance update changes nothing",
                "update",
            )));
        }
        if !update.changes_configuration() {
            return self.rename_instance(token, id, update.name.as_deref().unwrap_or_default()).await;
        }

        let outcome = self
            .client
            .dispatch::<Instance>(token, Action::Update, Some(id), Some(to_payload(update)?))
            .await?;
        debug!("Update of instance {id} submitted (conflict: {})", outcome.is_conflict());

        self.wait(token, Action::Update, id, cancel).await
    }

    /// Moves an instance from `current` to `desired`, one field per PATCH.
    ///
    /// Fields already at their desired value are skipped. A rename goes first.
    /// Secondaries are then reduced, so the remaining changes roll over fewer
    /// members, before memory, `vector_optimized`, `graph_analytics_plugin` and
    /// `cdc_enrichment_mode` are changed; added secondaries come last. Each
    /// change is waited on before the next is sent.
    ///
    /// Returns `current` unchanged when nothing differs.
    ///
    /// # Errors
    ///
    /// Returns the first rejected or timed-out change; later changes are not sent.
    pub async fn apply_changes(
        &self,
        token: &AccessToken,
        current: &Instance,
        desired: &InstanceUpdate,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        let id = current.id.as_str();
        let mut instance = current.clone();

        if let Some(name) = desired.name.as_deref().filter(|name| *name != current.name) {
            instance = self.rename_instance(token, id, name).await?;
        }

        let steps = ordered_changes(current, desired);
        if steps.is_empty() {
            debug!("Instance {id} already matches the requested configuration");
        }
        for (index, step) in steps.iter().enumerate() {
            info!("Updating instance {id} ({}/{}): {step:?}", index + 1, steps.len());
            instance = self.update_instance(token, id, step, cancel).await?;
        }

        Ok(instance)
    }

    /// Creates a customer-managed key and waits until it is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is invalid, the name is taken, or the
    /// key does not become ready in time.
    pub async fn create_key(
        &self,
        token: &AccessToken,
        request: &CreateKeyRequest,
        cancel: &CancellationToken,
    ) -> Result<CustomerManagedKey> {
        validate_tenant_id(&request.tenant_id)?;
        self.client
            .ensure_name_available(token, CustomerManagedKey::KIND, &request.tenant_id, &request.name)
            .await?;

        let created: CustomerManagedKey = self.submit_create(token, request).await?;
        info!("Key {} created as {}", request.name, created.id);

        self.wait(token, Action::Create, &created.id, cancel).await
    }

    /// Deletes a customer-managed key and waits until it is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected or does not finish in time.
    pub async fn delete_key(
        &self,
        token: &AccessToken,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.delete::<CustomerManagedKey>(token, id, cancel).await
    }

    async fn submit_create<R: Resource, P: Serialize + Sync>(
        &self,
        token: &AccessToken,
        request: &P,
    ) -> Result<R> {
        self.client
            .dispatch::<R>(token, Action::Create, None, Some(to_payload(request)?))
            .await?
            .into_resource()
            .ok_or_else(|| {
                AuraError::Api(ApiError::invalid_response(format!(
                    "Create response did not describe the new {}",
                    R::KIND
                )))
            })
    }

    async fn delete<R: Resource>(
        &self,
        token: &AccessToken,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match self
            .client
            .dispatch::<R>(token, Action::Delete, Some(id), None)
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                info!("{} {id} already deleted", R::KIND);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        self.poller
            .await_completion::<T, R>(&self.client, token, Action::Delete, id, cancel)
            .await?;
        info!("{} {id} deleted", R::KIND);
        Ok(())
    }

    async fn transition(
        &self,
        token: &AccessToken,
        action: Action,
        id: &str,
        wait: bool,
        cancel: &CancellationToken,
    ) -> Result<Instance> {
        let outcome = self
            .client
            .dispatch::<Instance>(token, action, Some(id), None)
            .await?;

        if let Dispatched::Conflict(current) = &outcome {
            let satisfied = completion::expectation(action, Instance::KIND)
                .is_some_and(|expectation| expectation.done.holds(&current.status));
            if satisfied {
                info!("Instance {id} is already {}", current.status);
                return Ok(current.clone());
            }
        }

        if !wait {
            return match outcome.into_resource() {
                Some(instance) => Ok(instance),
                None => self.client.fetch(token, id).await,
            };
        }

        self.wait(token, action, id, cancel).await
    }

    async fn wait<R: Resource>(
        &self,
        token: &AccessToken,
        action: Action,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<R> {
        self.poller
            .await_completion::<T, R>(&self.client, token, action, id, cancel)
            .await?
            .ok_or_else(|| {
                AuraError::Api(ApiError::NotFound {
                    kind: R::KIND.to_string(),
                    id: id.to_string(),
                })
            })
    }
}

fn to_payload<P: Serialize>(payload: &P) -> Result<Value> {
    serde_json::to_value(payload)
        .map_err(|e| AuraError::internal(format!("Failed to serialize request: {e}")))
}

/// Splits `desired` into single-field updates, in the order they are safe to apply.
fn ordered_changes(current: &Instance, desired: &InstanceUpdate) -> Vec<InstanceUpdate> {
    let secondaries = current.secondaries_count.unwrap_or(0);
    let mut steps = Vec::new();

    if let Some(count) = desired.secondaries_count.filter(|count| *count < secondaries) {
        steps.push(InstanceUpdate::secondaries(count));
    }
    if let Some(memory) = desired
        .memory
        .as_deref()
        .filter(|memory| current.memory.as_deref() != Some(*memory))
    {
        steps.push(InstanceUpdate::memory(memory));
    }
    if let Some(enabled) = desired
        .vector_optimized
        .filter(|enabled| *enabled != current.vector_optimized.unwrap_or(false))
    {
        steps.push(InstanceUpdate::flag(InstanceFlag::VectorOptimized(enabled)));
    }
    if let Some(enabled) = desired
        .graph_analytics_plugin
        .filter(|enabled| *enabled != current.graph_analytics_plugin.unwrap_or(false))
    {
        steps.push(InstanceUpdate::flag(InstanceFlag::GraphAnalyticsPlugin(enabled)));
    }
    if let Some(mode) = desired
        .cdc_enrichment_mode
        .as_deref()
        .filter(|mode| current.cdc_enrichment_mode.as_deref() != Some(*mode))
    {
        steps.push(InstanceUpdate::flag(InstanceFlag::CdcEnrichmentMode(mode.to_string())));
    }
    if let Some(count) = desired.secondaries_count.filter(|count| *count > secondaries) {
        steps.push(InstanceUpdate::secondaries(count));
    }

    steps
}

fn carry_credentials(instance: &mut Instance, created: &Instance) {
    if instance.password.is_none() {
        instance.password.clone_from(&created.password);
    }
    if instance.username.is_none() {
        instance.username.clone_from(&created.username);
    }
}
