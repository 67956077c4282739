//! Volume specs handed over by the volume-plugin framework.
//!
//! A Flocker volume can be declared inline in a pod or through a persistent
//! volume. Both variants normalize to the same [`NormalizedSource`], which is
//! all the provisioner needs.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::DatasetName;

/// Name under which the plugin registers with the volume framework.
pub const PLUGIN_NAME: &str = "kubernetes.io/flocker";

/// Flocker-specific part of a volume declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockerVolumeSource {
    /// Name of the dataset backing the volume.
    pub dataset_name: String,
}

/// A volume declared inline in a pod spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineVolume {
    /// Volume name within the pod.
    pub name: String,
    /// Flocker source, if this volume is backed by Flocker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flocker: Option<FlockerVolumeSource>,
}

/// A persistent volume bound to the pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentVolume {
    /// Persistent volume name.
    pub name: String,
    /// Flocker source, if this volume is backed by Flocker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flocker: Option<FlockerVolumeSource>,
}

/// The two ways a volume reaches the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VolumeSpec {
    /// Declared inline in the pod.
    Inline(InlineVolume),
    /// Declared through a persistent volume.
    Persistent(PersistentVolume),
}

/// What the provisioner consumes, regardless of how the volume was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSource {
    /// Dataset to find or create.
    pub dataset_name: DatasetName,
    /// Whether the volume should be mounted read-only.
    pub read_only: bool,
}

impl VolumeSpec {
    /// The volume's own name (not the dataset name).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Inline(v) => &v.name,
            Self::Persistent(v) => &v.name,
        }
    }

    fn flocker(&self) -> Option<&FlockerVolumeSource> {
        match self {
            Self::Inline(v) => v.flocker.as_ref(),
            Self::Persistent(v) => v.flocker.as_ref(),
        }
    }

    /// Whether this spec carries a Flocker source in either variant.
    #[must_use]
    pub fn can_support(&self) -> bool {
        self.flocker().is_some()
    }

    /// Project the volume spec onto the fields the provisioner needs.
    ///
    /// Flocker volumes are always read-write.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnsupportedSource` if there is no Flocker source,
    /// or `CoreError::EmptyIdentifier` if the dataset name is empty.
    pub fn normalize(&self) -> Result<NormalizedSource> {
        let source = self.flocker().ok_or(CoreError::UnsupportedSource)?;
        Ok(NormalizedSource {
            dataset_name: DatasetName::new(source.dataset_name.clone())?,
            read_only: false,
        })
    }
}
