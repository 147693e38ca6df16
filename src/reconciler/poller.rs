//! Completion poller.
//!
//! Blocks until a submitted action reaches its terminal status, the attempt
//! ceiling is hit, the caller cancels, or a status fetch fails.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aura::{AccessToken, Action, AuraClient, Resource, ResourceStatus, Transport};
use crate::config::PollingConfig;
use crate::error::{AuraError, ReconcileError, Result};

use super::completion;

/// Runtime polling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between polls.
    pub interval: Duration,
    /// Total polling budget.
    pub timeout: Duration,
    /// Initial polls whose status is not trusted.
    pub warmup_ticks: u32,
    /// Delay after each warm-up poll.
    pub warmup_delay: Duration,
    /// Delay after the terminal status is seen.
    pub settle_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            timeout: Duration::from_secs(config.timeout_minutes.saturating_mul(60)),
            warmup_ticks: config.warmup_ticks,
            warmup_delay: Duration::from_secs(config.warmup_delay_secs),
            settle_delay: Duration::from_secs(config.settle_delay_secs),
        }
    }
}

impl PollConfig {
    /// Non-terminal polls allowed before giving up: `ceil(timeout / interval)`.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        let attempts = self.timeout.as_millis().div_ceil(interval).max(1);
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }
}

/// First-observed status and later transitions, kept for diagnostics.
#[derive(Debug, Default)]
struct StatusTrace {
    initial: Option<ResourceStatus>,
    last: Option<ResourceStatus>,
    transitions: u32,
}

impl StatusTrace {
    fn observe(&mut self, status: &ResourceStatus) {
        match &self.last {
            None => {
                debug!("Initial status: {status}");
                self.initial = Some(status.clone());
            }
            Some(last) if last != status => {
                self.transitions += 1;
                debug!("Status changed from {last} to {status}");
            }
            Some(_) => {}
        }
        self.last = Some(status.clone());
    }
}

/// Polls a resource until an action completes.
#[derive(Debug, Clone, Default)]
pub struct CompletionPoller {
    config: PollConfig,
}

impl CompletionPoller {
    /// Creates a poller.
    #[must_use]
    pub const fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Returns the polling settings.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Waits for `action` on resource `id` to complete.
    ///
    /// Returns the last fetched resource, or `None` when the resource vanished
    /// and absence counts as completion (delete).
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Timeout`] once the attempt ceiling is reached,
    /// [`ReconcileError::Cancelled`] if `cancel` fires, [`ReconcileError::PollFailed`]
    /// if a fetch fails, and [`ReconcileError::UnsupportedAction`] if the action
    /// has no completion rule for the resource kind.
    pub async fn await_completion<T, R>(
        &self,
        client: &AuraClient<T>,
        token: &AccessToken,
        action: Action,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<R>>
    where
        T: Transport,
        R: Resource,
    {
        let kind = R::KIND;
        let expectation = completion::expectation(action, kind).ok_or_else(|| {
            ReconcileError::UnsupportedAction {
                action: action.to_string(),
                kind: kind.to_string(),
            }
        })?;

        let max_attempts = self.config.max_attempts();
        let mut attempts = 0;
        let mut tick = 0;
        let mut transited = expectation.transit.is_none();
        let mut trace = StatusTrace::default();

        info!("Waiting for {} {kind} {id} (max {max_attempts} polls)", action.progressive());

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(action, id));
            }

            let resource = match client.fetch::<R>(token, id).await {
                Ok(resource) => resource,
                Err(e) if e.is_not_found() && expectation.absent_is_complete => {
                    info!("{kind} {id} no longer exists, {action} complete");
                    return Ok(None);
                }
                Err(e) => {
                    return Err(AuraError::Reconcile(ReconcileError::PollFailed {
                        action: action.progressive().to_string(),
                        id: id.to_string(),
                        source: Box::new(e),
                    }));
                }
            };

            let status = resource.status();
            trace.observe(status);

            if !transited && expectation.transit.is_some_and(|c| c.holds(status)) {
                debug!("{kind} {id} entered {status}, awaiting settle");
                transited = true;
            }

            let warming_up = tick < self.config.warmup_ticks;
            let complete = !warming_up && transited && expectation.done.holds(status);
            debug!(tick, attempts, warming_up, complete, "{kind} {id} status {status}");

            if complete {
                info!(
                    "{action} of {kind} {id} complete after {} transitions from {}",
                    trace.transitions,
                    trace.initial.as_ref().unwrap_or(status)
                );
                // Cancelling the settle delay still reports completion.
                sleep_or_cancel(self.config.settle_delay, cancel).await;
                return Ok(Some(resource));
            }

            attempts += 1;
            if attempts >= max_attempts {
                return Err(AuraError::Reconcile(ReconcileError::Timeout {
                    action: action.progressive().to_string(),
                    kind: kind.to_string(),
                    id: id.to_string(),
                    attempts,
                }));
            }

            let delay = if warming_up {
                self.config.warmup_delay
            } else {
                self.config.interval
            };
            if sleep_or_cancel(delay, cancel).await {
                return Err(cancelled(action, id));
            }
            tick += 1;
        }
    }
}

/// Sleeps for `delay`; returns true if cancelled first.
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = tokio::time::sleep(delay) => false,
        () = cancel.cancelled() => true,
    }
}

fn cancelled(action: Action, id: &str) -> AuraError {
    AuraError::Reconcile(ReconcileError::Cancelled {
        action: action.progressive().to_string(),
        id: id.to_string(),
    })
}
