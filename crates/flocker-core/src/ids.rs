//! Identifier types for datasets and their owners.
//!
//! The control service hands out opaque dataset IDs and knows datasets by a
//! user-supplied name. Both are kept as distinct newtypes so a name can never
//! be passed where an ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// An opaque dataset identifier assigned by the control service.
///
/// The value is never interpreted locally; it is only compared and echoed
/// back to the service.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetId(String);

impl DatasetId {
    /// Create a `DatasetId`, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyIdentifier` if `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::EmptyIdentifier("dataset id"));
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetId({})", self.0)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DatasetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DatasetId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatasetId> for String {
    fn from(id: DatasetId) -> Self {
        id.0
    }
}

impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The user-facing name of a dataset.
///
/// This is the key callers use to find an existing volume. The control
/// service stores it as `metadata.name` and offers no lookup by it, so
/// matching happens client-side.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetName(String);

impl DatasetName {
    /// Create a `DatasetName`, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyIdentifier` if `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::EmptyIdentifier("dataset name"));
        }
        Ok(Self(value))
    }

    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetName({})", self.0)
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DatasetName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DatasetName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatasetName> for String {
    fn from(name: DatasetName) -> Self {
        name.0
    }
}

/// Identity recorded by the control service as a dataset's primary.
///
/// In practice this is the UID of the requesting pod. It may be empty when
/// the caller has no identity to offer; the service decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an owner identity string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_id_rejects_empty() {
        assert!(DatasetId::new("").is_err());
        assert!("".parse::<DatasetId>().is_err());
    }

    #[test]
    fn dataset_id_display() {
        let id = DatasetId::new("The-42-id").unwrap();
        assert_eq!(id.to_string(), "The-42-id");
        assert_eq!(format!("{id:?}"), "DatasetId(The-42-id)");
    }

    #[test]
    fn dataset_id_serde_rejects_empty() {
        let ok: DatasetId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok.as_str(), "abc");
        assert!(serde_json::from_str::<DatasetId>("\"\"").is_err());
    }

    #[test]
    fn dataset_name_rejects_empty() {
        assert!(DatasetName::new("").is_err());
        assert_eq!(DatasetName::new("target").unwrap().as_str(), "target");
    }

    #[test]
    fn owner_id_is_transparent() {
        let owner = OwnerId::from("pod-uid");
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"pod-uid\"");
        assert_eq!(OwnerId::default().as_str(), "");
    }
}
