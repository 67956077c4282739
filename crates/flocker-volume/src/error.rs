//! Provisioning error types.

use std::time::Duration;

use flocker_client::ClientError;
use flocker_core::{CoreError, DatasetId};
use thiserror::Error;

/// A result type using `ProvisionError`.
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can occur while provisioning a volume.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A control service call failed outside the convergence wait.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The dataset did not get a mount path within the configured bound.
    #[error("dataset {dataset_id} not ready after {waited:?}: {last_error}")]
    Timeout {
        /// The dataset that was being waited on.
        dataset_id: DatasetId,
        /// How long the wait lasted.
        waited: Duration,
        /// The last lookup failure observed before giving up.
        #[source]
        last_error: ClientError,
    },

    /// The volume spec could not be turned into a dataset request.
    #[error("invalid volume source: {0}")]
    Source(#[from] CoreError),
}

impl ProvisionError {
    /// Returns `true` if the control service refused the request outright.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Client(ClientError::RemoteRejected { .. }))
    }

    /// Returns `true` if the convergence wait ran out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
