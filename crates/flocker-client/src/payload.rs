//! Wire payloads of the control service dataset API and their decoders.
//!
//! ```text
//! GET  /v1/configuration/datasets  -> [{primary, dataset_id, maximum_size, metadata: {name}}]
//! POST /v1/configuration/datasets  <- {primary, maximum_size, metadata: {name}}
//!                                  -> {primary, dataset_id, maximum_size, metadata: {name}}
//! GET  /v1/state/datasets          -> [{dataset_id, path}]
//! ```

use std::path::PathBuf;

use flocker_core::{DatasetId, OwnerId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::{DatasetConfiguration, DatasetState};

#[derive(Debug, Serialize)]
pub(crate) struct MetadataRequest<'a> {
    pub name: &'a str,
}

/// Request body for creating a dataset configuration.
#[derive(Debug, Serialize)]
pub(crate) struct CreateConfigurationRequest<'a> {
    pub primary: &'a str,
    pub maximum_size: u64,
    pub metadata: MetadataRequest<'a>,
}

#[derive(Debug, Deserialize)]
struct ConfigurationPayload {
    #[serde(default)]
    dataset_id: String,
    #[serde(default)]
    primary: Option<String>,
    #[serde(default)]
    maximum_size: Option<u64>,
    #[serde(default)]
    metadata: Option<MetadataPayload>,
}

#[derive(Debug, Deserialize)]
struct MetadataPayload {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    #[serde(default)]
    dataset_id: String,
    #[serde(default)]
    path: Option<String>,
}

impl TryFrom<ConfigurationPayload> for DatasetConfiguration {
    type Error = ClientError;

    fn try_from(payload: ConfigurationPayload) -> Result<Self> {
        Ok(Self {
            dataset_id: dataset_id(payload.dataset_id)?,
            primary: OwnerId::new(payload.primary.unwrap_or_default()),
            name: payload
                .metadata
                .map(|m| m.name)
                .unwrap_or_default(),
            maximum_size_bytes: payload.maximum_size,
        })
    }
}

fn dataset_id(raw: String) -> Result<DatasetId> {
    DatasetId::new(raw).map_err(|e| ClientError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(format!("invalid {what}: {e}")))
}

/// Keep listing entries that carry a dataset ID, logging the ones that don't.
fn has_dataset_id(dataset_id: &str, listing: &'static str) -> bool {
    if dataset_id.is_empty() {
        tracing::warn!(listing, "Skipping listing entry without a dataset id");
        return false;
    }
    true
}

/// Decode the body of `GET configuration/datasets`, keeping server order.
///
/// Entries without a dataset ID are skipped so that one bad record does not
/// hide the others.
///
/// # Errors
///
/// Returns `ClientError::Decode` if the body is not a JSON array of
/// configurations.
pub fn decode_configurations(body: &[u8]) -> Result<Vec<DatasetConfiguration>> {
    decode::<Vec<ConfigurationPayload>>(body, "configurations payload")?
        .into_iter()
        .filter(|c| has_dataset_id(&c.dataset_id, "configurations"))
        .map(DatasetConfiguration::try_from)
        .collect()
}

/// Decode the body echoed back by `POST configuration/datasets`.
///
/// # Errors
///
/// Returns `ClientError::Decode` if the body is not a configuration or
/// carries no dataset ID.
pub fn decode_created(body: &[u8]) -> Result<DatasetConfiguration> {
    decode::<ConfigurationPayload>(body, "created configuration")?.try_into()
}

/// Decode the body of `GET state/datasets`.
///
/// Entries without a path have not converged yet and are left out, as are
/// entries without a dataset ID.
///
/// # Errors
///
/// Returns `ClientError::Decode` if the body is not a JSON array of states.
pub fn decode_states(body: &[u8]) -> Result<Vec<DatasetState>> {
    decode::<Vec<StatePayload>>(body, "states payload")?
        .into_iter()
        .filter(|s| has_dataset_id(&s.dataset_id, "states"))
        .filter_map(|s| match s.path {
            Some(path) if !path.is_empty() => Some((s.dataset_id, path)),
            _ => None,
        })
        .map(|(id, path)| {
            Ok(DatasetState {
                dataset_id: dataset_id(id)?,
                path: PathBuf::from(path),
            })
        })
        .collect()
}

/// First configuration whose metadata name equals `name` exactly.
#[must_use]
pub fn find_id_by_name<'a>(
    configurations: &'a [DatasetConfiguration],
    name: &str,
) -> Option<&'a DatasetId> {
    configurations
        .iter()
        .find(|c| c.name == name)
        .map(|c| &c.dataset_id)
}

/// State entry for `dataset_id`, if the dataset has converged.
#[must_use]
pub fn find_state<'a>(states: &'a [DatasetState], dataset_id: &DatasetId) -> Option<&'a DatasetState> {
    states.iter().find(|s| &s.dataset_id == dataset_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIGURATIONS: &str = r#"[
        {"dataset_id": "1-2-3", "metadata": {"name": "test"}},
        {"dataset_id": "The-42-id", "metadata": {"name": "target"}},
        {"dataset_id": "later-dup", "metadata": {"name": "target"}}
    ]"#;

    const STATES: &str = r#"[
        {"dataset_id": "1-2-3", "path": "not-this-one"},
        {"dataset_id": "abc", "path": "awesome-path"}
    ]"#;

    #[test]
    fn finds_first_configuration_by_name() {
        let configurations = decode_configurations(CONFIGURATIONS.as_bytes()).unwrap();

        let id = find_id_by_name(&configurations, "target").unwrap();
        assert_eq!(id.as_str(), "The-42-id");
        assert!(find_id_by_name(&configurations, "missing").is_none());
    }

    #[test]
    fn name_match_is_exact() {
        let configurations = decode_configurations(CONFIGURATIONS.as_bytes()).unwrap();
        assert!(find_id_by_name(&configurations, "targ").is_none());
        assert!(find_id_by_name(&configurations, "Target").is_none());
    }

    #[test]
    fn optional_configuration_fields_default() {
        let configurations = decode_configurations(
            br#"[{"dataset_id": "x", "primary": "node-1", "maximum_size": 1024}]"#,
        )
        .unwrap();
        assert_eq!(configurations[0].name, "");
        assert_eq!(configurations[0].primary.as_str(), "node-1");
        assert_eq!(configurations[0].maximum_size_bytes, Some(1024));

    }

    #[test]
    fn entries_without_id_do_not_hide_the_rest() {
        let configurations = decode_configurations(
            br#"[{"dataset_id": "", "metadata": {"name": "other"}},
                {"metadata": {"name": "other"}},
                {"dataset_id": "abc", "metadata": {"name": "target"}}]"#,
        )
        .unwrap();
        assert_eq!(configurations.len(), 1);
        assert_eq!(
            find_id_by_name(&configurations, "target").map(DatasetId::as_str),
            Some("abc")
        );

        let states = decode_states(
            br#"[{"dataset_id": "", "path": "/flocker/x"},
                {"path": "/flocker/y"},
                {"dataset_id": "abc", "path": "/flocker/abc"}]"#,
        )
        .unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].dataset_id.as_str(), "abc");
    }

    #[test]
    fn malformed_configurations_are_decode_errors() {
        let err = decode_configurations(b"invalid { json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn finds_state_path_by_id() {
        let states = decode_states(STATES.as_bytes()).unwrap();
        let abc = DatasetId::new("abc").unwrap();
        let missing = DatasetId::new("this is not going to be there").unwrap();

        assert_eq!(
            find_state(&states, &abc).unwrap().path,
            PathBuf::from("awesome-path")
        );
        assert!(find_state(&states, &missing).is_none());
    }

    #[test]
    fn states_without_path_are_not_live() {
        let states =
            decode_states(br#"[{"dataset_id": "a"}, {"dataset_id": "b", "path": ""}]"#).unwrap();
        assert!(states.is_empty());
    }

    #[test]
    fn malformed_states_are_decode_errors() {
        let err = decode_states(b"not even } json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn created_configuration_requires_id() {
        let created = decode_created(br#"{"dataset_id": "123"}"#).unwrap();
        assert_eq!(created.dataset_id.as_str(), "123");

        assert!(decode_created(br#"{"dataset_id": ""}"#).is_err());
        assert!(decode_created(b"{}").is_err());
    }

    #[test]
    fn create_request_shape() {
        let request = CreateConfigurationRequest {
            primary: "pod-uid",
            maximum_size: 107_374_182_400,
            metadata: MetadataRequest { name: "dir" },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "primary": "pod-uid",
                "maximum_size": 107_374_182_400_u64,
                "metadata": {"name": "dir"}
            })
        );
        assert!(json.get("dataset_id").is_none());
    }
}
