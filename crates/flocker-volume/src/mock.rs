//! In-memory control service for tests.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use flocker_client::{ClientError, DatasetApi, DatasetConfiguration, DatasetState, Result};
use flocker_core::{DatasetId, DatasetName, OwnerId};
use parking_lot::Mutex;

/// A dataset API that keeps configurations and states in memory.
///
/// Created datasets become live after a configurable number of state
/// lookups have missed, which simulates the service's convergence delay.
pub struct MockDatasetApi {
    inner: Mutex<Inner>,
    converge_after: Option<usize>,
}

#[derive(Default)]
struct Inner {
    configurations: Vec<DatasetConfiguration>,
    live: Vec<DatasetState>,
    pending: HashMap<DatasetId, Pending>,
    reject_status: Option<u16>,
    listing_error: Option<ClientError>,
    state_error: Option<ClientError>,
    create_calls: usize,
    state_calls: usize,
    next_id: u64,
}

struct Pending {
    path: PathBuf,
    misses_left: usize,
}

impl Default for MockDatasetApi {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            converge_after: Some(0),
        }
    }
}

impl MockDatasetApi {
    /// Create a mock where created datasets are live immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Created datasets miss `lookups` state lookups before becoming live.
    #[must_use]
    pub fn converge_after(mut self, lookups: usize) -> Self {
        self.converge_after = Some(lookups);
        self
    }

    /// Created datasets never become live.
    #[must_use]
    pub fn never_converge(mut self) -> Self {
        self.converge_after = None;
        self
    }

    /// Seed a configuration named `name` that is already live at `path`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty.
    pub fn add_live_dataset(&self, name: &str, id: &str, path: &str) {
        let dataset_id = DatasetId::new(id).expect("non-empty dataset id");
        let mut inner = self.inner.lock();
        inner.configurations.push(configuration(&dataset_id, name, &OwnerId::default()));
        inner.live.push(DatasetState {
            dataset_id,
            path: PathBuf::from(path),
        });
    }

    /// Seed a configuration named `name` that becomes live at `path` after
    /// `misses` state lookups.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty.
    pub fn add_pending_dataset(&self, name: &str, id: &str, path: &str, misses: usize) {
        let dataset_id = DatasetId::new(id).expect("non-empty dataset id");
        let mut inner = self.inner.lock();
        inner.configurations.push(configuration(&dataset_id, name, &OwnerId::default()));
        inner.pending.insert(
            dataset_id,
            Pending {
                path: PathBuf::from(path),
                misses_left: misses,
            },
        );
    }

    /// Answer every creation with `status`.
    pub fn reject_creates(&self, status: u16) {
        self.inner.lock().reject_status = Some(status);
    }

    /// Fail every configuration listing with `error`.
    pub fn fail_configuration_listing(&self, error: ClientError) {
        self.inner.lock().listing_error = Some(error);
    }

    /// Fail every state lookup with `error` until cleared.
    pub fn fail_state_lookups(&self, error: ClientError) {
        self.inner.lock().state_error = Some(error);
    }

    /// Stop failing state lookups.
    pub fn clear_state_failures(&self) {
        self.inner.lock().state_error = None;
    }

    /// Number of creation requests received.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.inner.lock().create_calls
    }

    /// Number of state lookups received.
    #[must_use]
    pub fn state_calls(&self) -> usize {
        self.inner.lock().state_calls
    }

    /// Primary recorded for a dataset.
    #[must_use]
    pub fn created_owner(&self, id: &str) -> Option<OwnerId> {
        self.inner
            .lock()
            .configurations
            .iter()
            .find(|c| c.dataset_id.as_str() == id)
            .map(|c| c.primary.clone())
    }
}

fn configuration(dataset_id: &DatasetId, name: &str, owner: &OwnerId) -> DatasetConfiguration {
    DatasetConfiguration {
        dataset_id: dataset_id.clone(),
        primary: owner.clone(),
        name: name.to_string(),
        maximum_size_bytes: None,
    }
}

#[async_trait]
impl DatasetApi for MockDatasetApi {
    async fn list_configurations(&self) -> Result<Vec<DatasetConfiguration>> {
        let inner = self.inner.lock();
        if let Some(err) = &inner.listing_error {
            return Err(err.clone());
        }
        Ok(inner.configurations.clone())
    }

    async fn list_states(&self) -> Result<Vec<DatasetState>> {
        let mut inner = self.inner.lock();
        inner.state_calls += 1;
        if let Some(err) = &inner.state_error {
            return Err(err.clone());
        }

        let mut converged = Vec::new();
        for (id, pending) in &mut inner.pending {
            if pending.misses_left == 0 {
                converged.push(id.clone());
            } else {
                pending.misses_left -= 1;
            }
        }
        for id in converged {
            if let Some(pending) = inner.pending.remove(&id) {
                inner.live.push(DatasetState {
                    dataset_id: id,
                    path: pending.path,
                });
            }
        }

        Ok(inner.live.clone())
    }

    async fn create_configuration(
        &self,
        owner: &OwnerId,
        name: &DatasetName,
        _maximum_size_bytes: u64,
    ) -> Result<DatasetId> {
        let mut inner = self.inner.lock();
        inner.create_calls += 1;
        if let Some(status) = inner.reject_status {
            return Err(ClientError::RemoteRejected {
                status,
                body: "rejected by mock".to_string(),
            });
        }

        inner.next_id += 1;
        let dataset_id = DatasetId::new(format!("dataset-{}", inner.next_id))
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let path = PathBuf::from(format!("/flocker/{dataset_id}"));

        inner
            .configurations
            .push(configuration(&dataset_id, name.as_str(), owner));
        if let Some(misses) = self.converge_after {
            inner.pending.insert(
                dataset_id.clone(),
                Pending {
                    path,
                    misses_left: misses,
                },
            );
        }

        Ok(dataset_id)
    }
}
