//! Create-or-find-then-wait provisioning.
//!
//! ```text
//!   find configuration by name ──found──▶ get state ──live──▶ path
//!            │                               │
//!        not found                       retriable
//!            ▼                               │
//!   create configuration ──rejected──▶ error │
//!            │                               │
//!            ▼                               ▼
//!   get state ──live──▶ path        poll every interval
//!            │                      until live or timeout
//!        not live ──────────────────────────▲
//! ```
//!
//! An existing configuration always wins over creating a new one, which
//! makes repeated calls for the same name idempotent. Concurrent calls for
//! the same name are not serialized here; if the service rejects the losing
//! creation, the rejection is returned as is and never retried.
//!
//! The wait is a plain future driven by a ticker and a deadline. Nothing is
//! spawned, so dropping the future (for example under the caller's own
//! `tokio::time::timeout`) stops polling immediately.

use std::path::PathBuf;
use std::sync::Arc;

use flocker_client::{ClientError, DatasetApi};
use flocker_core::{DatasetId, DatasetName, OwnerId};
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::ProvisionConfig;
use crate::error::{ProvisionError, Result};

/// Produces mount paths for named datasets.
///
/// Holds no per-call state; one instance can serve concurrent calls for
/// different names.
pub struct Provisioner<A: ?Sized> {
    api: Arc<A>,
    config: ProvisionConfig,
}

impl<A: ?Sized> Clone for Provisioner<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: self.config.clone(),
        }
    }
}

impl<A: DatasetApi + ?Sized> Provisioner<A> {
    /// Create a provisioner over `api`.
    #[must_use]
    pub fn new(api: Arc<A>, config: ProvisionConfig) -> Self {
        Self { api, config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(api: Arc<A>) -> Self {
        Self::new(api, ProvisionConfig::default())
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Get the dataset API.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Ensure a dataset named `name` exists and return its mount path.
    ///
    /// Reuses an existing configuration with that name if there is one,
    /// otherwise creates it with `owner` as primary. Then waits for the
    /// dataset to converge.
    ///
    /// # Errors
    ///
    /// - `ProvisionError::Client` if the lookup or creation fails, including
    ///   a rejected creation (no wait is attempted in that case), or if the
    ///   state of an existing dataset fails with a non-retriable error
    /// - `ProvisionError::Timeout` if the dataset has no path once the
    ///   configured timeout has elapsed
    pub async fn provision(
        &self,
        owner: &OwnerId,
        name: &DatasetName,
        maximum_size_bytes: u64,
    ) -> Result<PathBuf> {
        match self.api.find_configuration_id_by_name(name).await {
            Ok(dataset_id) => {
                tracing::debug!(name = %name, dataset_id = %dataset_id, "Found existing dataset");
                return match self.api.get_state(&dataset_id).await {
                    Ok(state) => Ok(state.path),
                    Err(e) if e.is_retriable() => {
                        log_miss(&dataset_id, &e);
                        self.poll_until_live(&dataset_id, e).await
                    }
                    Err(e) => Err(e.into()),
                };
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let dataset_id = self
            .api
            .create_configuration(owner, name, maximum_size_bytes)
            .await?;

        match self.api.get_state(&dataset_id).await {
            Ok(state) => Ok(state.path),
            Err(e) => {
                log_miss(&dataset_id, &e);
                self.poll_until_live(&dataset_id, e).await
            }
        }
    }

    /// Poll the state of `dataset_id` once per interval until it has a path.
    ///
    /// Every lookup error is swallowed; the most recent one is reported if
    /// the deadline passes first.
    async fn poll_until_live(
        &self,
        dataset_id: &DatasetId,
        mut last_error: ClientError,
    ) -> Result<PathBuf> {
        let period = self.config.poll_interval();
        let started = Instant::now();
        let deadline = started + self.config.timeout();

        let mut ticker = tokio::time::interval_at(started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let polling = async {
            loop {
                ticker.tick().await;
                match self.api.get_state(dataset_id).await {
                    Ok(state) => return state.path,
                    Err(e) => {
                        log_miss(dataset_id, &e);
                        last_error = e;
                    }
                }
            }
        };

        let outcome = tokio::time::timeout_at(deadline, polling).await;
        if let Ok(path) = outcome {
            tracing::info!(dataset_id = %dataset_id, path = %path.display(), "Dataset is live");
            return Ok(path);
        }

        let waited = started.elapsed();
        tracing::error!(
            dataset_id = %dataset_id,
            waited = ?waited,
            error = %last_error,
            "Timed out waiting for dataset"
        );
        Err(ProvisionError::Timeout {
            dataset_id: dataset_id.clone(),
            waited,
            last_error,
        })
    }
}

fn log_miss(dataset_id: &DatasetId, error: &ClientError) {
    if error.is_not_found() {
        tracing::debug!(dataset_id = %dataset_id, "Dataset not live yet");
    } else {
        tracing::warn!(dataset_id = %dataset_id, error = %error, "Dataset state lookup failed");
    }
}
