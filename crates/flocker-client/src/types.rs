//! Dataset records as seen by callers of the client.

use std::path::PathBuf;

use flocker_core::{DatasetId, OwnerId};

/// A dataset configuration: the desired state recorded by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfiguration {
    /// Identifier assigned by the service on creation.
    pub dataset_id: DatasetId,
    /// The node/workload currently recorded as primary.
    pub primary: OwnerId,
    /// Name stored in the dataset metadata; may be empty for unnamed datasets.
    pub name: String,
    /// Size limit in bytes, if the service reported one.
    pub maximum_size_bytes: Option<u64>,
}

/// A dataset state: where a converged dataset is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetState {
    /// Identifier joining this state to its configuration.
    pub dataset_id: DatasetId,
    /// Filesystem path the dataset is mounted at on its primary.
    pub path: PathBuf,
}
