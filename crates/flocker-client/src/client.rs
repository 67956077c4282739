//! Dataset API of the control service.
//!
//! [`DatasetApi`] is the interface the provisioner depends on;
//! [`ControlServiceClient`] implements it over a [`Transport`]. No retry or
//! wait logic lives here: every method is exactly one round trip.

use async_trait::async_trait;
use flocker_core::{DatasetId, DatasetName, OwnerId};

use crate::config::{ControlServiceConfig, ConnectionParams};
use crate::error::{ClientError, LookupKind, Result};
use crate::payload::{self, CreateConfigurationRequest, MetadataRequest};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::types::{DatasetConfiguration, DatasetState};

const CONFIGURATION_DATASETS: &str = "configuration/datasets";
const STATE_DATASETS: &str = "state/datasets";

/// Dataset operations offered by the control service.
///
/// This trait abstracts the client so the provisioning protocol can be
/// tested against an in-memory double.
#[async_trait]
pub trait DatasetApi: Send + Sync {
    /// Fetch every dataset configuration, in server order.
    ///
    /// # Errors
    ///
    /// Returns `Transport` on network failure, `RemoteRejected` on a
    /// non-success status and `Decode` on a malformed body.
    async fn list_configurations(&self) -> Result<Vec<DatasetConfiguration>>;

    /// Fetch every converged dataset state.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetApi::list_configurations`].
    async fn list_states(&self) -> Result<Vec<DatasetState>>;

    /// Create a configuration named `name` with `owner` as primary and
    /// return the ID the service assigned.
    ///
    /// Not idempotent: a retry after an ambiguous failure may create a
    /// second dataset with the same name.
    ///
    /// # Errors
    ///
    /// Returns `RemoteRejected` if the status is outside 1xx-2xx (including
    /// a conflict with a concurrent creation), `Transport` or `Decode`
    /// otherwise.
    async fn create_configuration(
        &self,
        owner: &OwnerId,
        name: &DatasetName,
        maximum_size_bytes: u64,
    ) -> Result<DatasetId>;

    /// ID of the first configuration whose metadata name equals `name`.
    ///
    /// The API has no name-keyed lookup, so this scans the full listing.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no configuration matches; propagates listing errors.
    async fn find_configuration_id_by_name(&self, name: &DatasetName) -> Result<DatasetId> {
        let configurations = self.list_configurations().await?;
        payload::find_id_by_name(&configurations, name.as_str())
            .cloned()
            .ok_or_else(|| ClientError::not_found(LookupKind::Configuration, name.as_str()))
    }

    /// State of `dataset_id`, once it has a mount path.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` while the dataset has not converged; propagates
    /// listing errors.
    async fn get_state(&self, dataset_id: &DatasetId) -> Result<DatasetState> {
        let states = self.list_states().await?;
        payload::find_state(&states, dataset_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(LookupKind::State, dataset_id.as_str()))
    }
}

/// Client for the control service dataset API.
///
/// Holds only immutable connection parameters, so one instance can be
/// shared across concurrent provisioning calls.
#[derive(Debug, Clone)]
pub struct ControlServiceClient<T = HttpTransport> {
    params: ConnectionParams,
    transport: T,
}

impl ControlServiceClient<HttpTransport> {
    /// Build a client from environment-derived configuration.
    ///
    /// With `use_tls`, the client authenticates with the configured client
    /// certificate; otherwise it uses a plain transport.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the parameters are invalid
    /// or the TLS material cannot be loaded.
    pub fn from_config(config: &ControlServiceConfig, use_tls: bool) -> Result<Self> {
        let transport = if use_tls {
            HttpTransport::mutual_tls(&config.tls)?
        } else {
            HttpTransport::plain()?
        };
        Self::new(config.connection.clone(), transport)
    }
}

impl<T: Transport> ControlServiceClient<T> {
    /// Create a client over an already configured transport.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the host is empty.
    pub fn new(params: ConnectionParams, transport: T) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, transport })
    }

    /// The connection parameters in use.
    #[must_use]
    pub const fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Full URL for `path` under the versioned API root.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.params.url(path)
    }

    async fn get(&self, path: &str) -> Result<HttpResponse> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET control service");
        let response = self.transport.send(HttpRequest::get(url)).await?;
        ensure_success(response)
    }
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ClientError::RemoteRejected {
            status: response.status,
            body: response.body_text(),
        })
    }
}

#[async_trait]
impl<T: Transport> DatasetApi for ControlServiceClient<T> {
    async fn list_configurations(&self) -> Result<Vec<DatasetConfiguration>> {
        let response = self.get(CONFIGURATION_DATASETS).await?;
        payload::decode_configurations(&response.body)
    }

    async fn list_states(&self) -> Result<Vec<DatasetState>> {
        let response = self.get(STATE_DATASETS).await?;
        payload::decode_states(&response.body)
    }

    async fn create_configuration(
        &self,
        owner: &OwnerId,
        name: &DatasetName,
        maximum_size_bytes: u64,
    ) -> Result<DatasetId> {
        let body = CreateConfigurationRequest {
            primary: owner.as_str(),
            maximum_size: maximum_size_bytes,
            metadata: MetadataRequest {
                name: name.as_str(),
            },
        };
        let request = HttpRequest::post_json(self.url(CONFIGURATION_DATASETS), &body)?;

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::error!(
                name = %name,
                status = response.status,
                "Control service rejected dataset creation"
            );
        }
        let response = ensure_success(response)?;

        let created = payload::decode_created(&response.body)?;
        tracing::info!(name = %name, dataset_id = %created.dataset_id, "Created dataset");
        Ok(created.dataset_id)
    }
}
