//! Core types for the Flocker volume provisioner.
//!
//! This crate provides the foundational types shared by the client and the
//! provisioning protocol:
//!
//! - **Identifiers**: `DatasetId`, `DatasetName` and `OwnerId`
//! - **Volume specs**: the inline/persistent tagged union and its normalized form
//! - **Error types**: `CoreError`
//!
//! # Example
//!
//! ```
//! use flocker_core::{FlockerVolumeSource, InlineVolume, VolumeSpec};
//!
//! let spec = VolumeSpec::Inline(InlineVolume {
//!     name: "data".to_string(),
//!     flocker: Some(FlockerVolumeSource {
//!         dataset_name: "postgres-data".to_string(),
//!     }),
//! });
//!
//! let source = spec.normalize().unwrap();
//! assert_eq!(source.dataset_name.as_str(), "postgres-data");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod source;

pub use error::{CoreError, Result};
pub use ids::{DatasetId, DatasetName, OwnerId};
pub use source::{
    FlockerVolumeSource, InlineVolume, NormalizedSource, PersistentVolume, VolumeSpec, PLUGIN_NAME,
};
