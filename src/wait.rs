//! Status polling with exponential backoff and cancellation support.
//!
//! Provides a generic poller that repeatedly refreshes remote state until a
//! target status is reached, a terminal failure is observed, the deadline
//! elapses, or the wait is cancelled.

use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::LifecycleError;

/// Canonical lifecycle states reported by remote AWS entities.
///
/// Parsed case-insensitively from the status strings the services return
/// (`CREATING`, `ACTIVE`, ...). `Deleted` is synthesized when the remote
/// confirms absence; unrecognized strings map to `Unknown`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ResourceStatus {
    #[strum(serialize = "creating")]
    Creating,
    #[strum(serialize = "active")]
    Active,
    #[strum(serialize = "updating")]
    Updating,
    #[strum(serialize = "deleting")]
    Deleting,
    #[strum(serialize = "deleted")]
    Deleted,
    #[strum(serialize = "failed")]
    Failed,
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl ResourceStatus {
    /// Parse a remote status string, mapping unknown values to `Unknown`.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }

    /// Check if the status is a terminal failure.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// One observation of remote state from a refresh function.
#[derive(Debug)]
pub enum Observation<T> {
    /// The entity exists and reports the given status
    Present { entity: T, status: ResourceStatus },
    /// The remote confirmed the entity is absent
    Absent,
}

/// Configuration for status polling with exponential backoff.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Initial delay between refreshes
    pub initial_delay: Duration,
    /// Maximum delay between refreshes (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timing out
    pub timeout: Duration,
    /// Jitter factor; 0.0 disables randomized delays
    pub jitter: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            timeout: Duration::from_secs(600),
            jitter: 0.25,
        }
    }
}

impl PollConfig {
    /// Create a new PollConfig with the given timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Poll remote state until one of the `target` statuses is reached.
///
/// Each tick calls `refresh`; refresh errors classified as not-found are
/// treated as an `Observation::Absent`. Absence is terminal: it succeeds
/// (returning `None`) iff `target` contains `Deleted`, and fails with
/// `NotFound` otherwise. A `Failed` status outside the target set aborts with
/// `FailedState`. Any other refresh error aborts the poll and is surfaced.
///
/// No state persists across invocations beyond the loop's own counters.
pub async fn poll_status<T, F, Fut>(
    config: PollConfig,
    cancel: Option<&CancellationToken>,
    refresh: F,
    target: &[ResourceStatus],
    resource_name: &str,
) -> Result<Option<T>, LifecycleError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Observation<T>, LifecycleError>>,
{
    let start = std::time::Instant::now();
    let mut attempts = 0u32;

    let mut builder = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .without_max_times();
    if config.jitter > 0.0 {
        builder = builder.with_jitter();
    }
    let mut delays = builder.build().into_iter();

    loop {
        attempts += 1;

        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(LifecycleError::Cancelled {
                    resource: resource_name.to_string(),
                });
            }
        }

        if start.elapsed() >= config.timeout {
            return Err(LifecycleError::Timeout {
                resource: resource_name.to_string(),
                elapsed: start.elapsed(),
                attempts,
            });
        }

        let observation = match refresh().await {
            Ok(obs) => obs,
            Err(e) if e.is_not_found() => Observation::Absent,
            Err(e) => {
                warn!(resource = %resource_name, error = %e, "Status refresh failed");
                return Err(e);
            }
        };

        match observation {
            Observation::Absent => {
                if target.contains(&ResourceStatus::Deleted) {
                    debug!(resource = %resource_name, attempts, "Resource is gone");
                    return Ok(None);
                }
                return Err(LifecycleError::NotFound {
                    resource_type: "resource",
                    resource_id: resource_name.to_string(),
                });
            }
            Observation::Present { entity, status } => {
                if target.contains(&status) {
                    debug!(resource = %resource_name, %status, attempts, "Target status reached");
                    return Ok(Some(entity));
                }
                if status.is_failure() {
                    return Err(LifecycleError::FailedState {
                        resource: resource_name.to_string(),
                        status,
                    });
                }

                let delay = delays.next().unwrap_or(config.max_delay);
                debug!(
                    resource = %resource_name,
                    %status,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Target status not reached, retrying"
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = async {
                        if let Some(token) = cancel {
                            token.cancelled().await
                        } else {
                            std::future::pending::<()>().await
                        }
                    } => {
                        return Err(LifecycleError::Cancelled {
                            resource: resource_name.to_string(),
                        });
                    }
                }
            }
        }
    }
}
