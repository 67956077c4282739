//! Bridge from a volume spec to a provisioned dataset.
//!
//! The volume framework hands over a spec and the pod's UID; this resolves
//! the volume spec to a dataset name, provisions it with the pod as primary and
//! returns what the mount step needs. Mounting itself happens elsewhere.

use std::path::PathBuf;

use flocker_client::DatasetApi;
use flocker_core::{DatasetName, OwnerId, VolumeSpec};

use crate::error::Result;
use crate::provision::Provisioner;

/// A dataset ready to be mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedVolume {
    /// The dataset that backs the volume.
    pub dataset_name: DatasetName,
    /// Where the dataset is available on its primary.
    pub path: PathBuf,
    /// Whether the volume must be mounted read-only.
    pub read_only: bool,
}

impl<A: DatasetApi + ?Sized> Provisioner<A> {
    /// Provision the dataset behind `spec` for the pod identified by `owner`.
    ///
    /// Uses the configured default size for new datasets.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Source` if the volume spec has no usable Flocker
    /// source, otherwise the errors of [`Provisioner::provision`].
    pub async fn set_up(&self, owner: &OwnerId, spec: &VolumeSpec) -> Result<ProvisionedVolume> {
        let source = spec.normalize()?;
        tracing::debug!(
            volume = spec.name(),
            dataset = %source.dataset_name,
            owner = %owner,
            "Setting up flocker volume"
        );

        let path = self
            .provision(owner, &source.dataset_name, self.config().maximum_size_bytes)
            .await?;

        Ok(ProvisionedVolume {
            dataset_name: source.dataset_name,
            path,
            read_only: source.read_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flocker_core::{CoreError, FlockerVolumeSource, InlineVolume, PersistentVolume};

    use super::*;
    use crate::error::ProvisionError;
    use crate::mock::MockDatasetApi;

    #[tokio::test]
    async fn persistent_spec_provisions_dataset() {
        let api = Arc::new(MockDatasetApi::new());
        let provisioner = Provisioner::with_defaults(Arc::clone(&api));
        let spec = VolumeSpec::Persistent(PersistentVolume {
            name: "pv-data".to_string(),
            flocker: Some(FlockerVolumeSource {
                dataset_name: "data".to_string(),
            }),
        });

        let volume = provisioner
            .set_up(&OwnerId::new("pod-uid"), &spec)
            .await
            .unwrap();

        assert_eq!(volume.dataset_name.as_str(), "data");
        assert_eq!(volume.path, PathBuf::from("/flocker/dataset-1"));
        assert!(!volume.read_only);
        assert_eq!(api.created_owner("dataset-1").unwrap().as_str(), "pod-uid");
    }

    #[tokio::test]
    async fn spec_without_flocker_source_is_rejected_before_any_call() {
        let api = Arc::new(MockDatasetApi::new());
        let provisioner = Provisioner::with_defaults(Arc::clone(&api));
        let spec = VolumeSpec::Inline(InlineVolume {
            name: "scratch".to_string(),
            flocker: None,
        });

        let err = provisioner
            .set_up(&OwnerId::new("pod-uid"), &spec)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::Source(CoreError::UnsupportedSource)
        ));
        assert_eq!(api.create_calls(), 0);
        assert_eq!(api.state_calls(), 0);
    }
}
