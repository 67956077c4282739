//! Create-or-find-then-wait provisioning of Flocker datasets.
//!
//! Given a dataset name, the [`Provisioner`] makes sure a dataset with that
//! name exists on the control service and waits, within a bound, until the
//! service reports a mount path for it.
//!
//! - An existing dataset with the name is always reused, never duplicated.
//! - A rejected creation (e.g. a 409 from a concurrent creator) is terminal.
//! - The wait polls on a fixed interval and gives up after a timeout,
//!   reporting the last lookup error.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flocker_client::{ControlServiceClient, ControlServiceConfig};
//! use flocker_core::{DatasetName, OwnerId};
//! use flocker_volume::{ProvisionConfig, Provisioner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ControlServiceConfig::from_env()?;
//! let client = Arc::new(ControlServiceClient::from_config(&config, true)?);
//! let provisioner = Provisioner::new(client, ProvisionConfig::default());
//!
//! let path = provisioner
//!     .provision(
//!         &OwnerId::new("6f1c1f3e-pod-uid"),
//!         &DatasetName::new("postgres-data")?,
//!         provisioner.config().maximum_size_bytes,
//!     )
//!     .await?;
//! println!("dataset live at {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! Enable the `test-utils` feature for [`MockDatasetApi`], an in-memory
//! control service with scripted convergence.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod provision;
pub mod setup;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use config::{ProvisionConfig, DEFAULT_MAXIMUM_SIZE_BYTES};
pub use error::{ProvisionError, Result};
pub use provision::Provisioner;
pub use setup::ProvisionedVolume;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockDatasetApi;

// Re-export commonly used types from dependencies for convenience
pub use flocker_client::{ClientError, ControlServiceClient, DatasetApi};
pub use flocker_core::{DatasetId, DatasetName, OwnerId, VolumeSpec};
