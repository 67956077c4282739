//! HTTP client for the Flocker control service dataset API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Provisioner         │
//! └──────────┬───────────┘
//!            │ DatasetApi (trait)
//! ┌──────────▼───────────┐
//! │ ControlServiceClient │  list / find by name / create / get state
//! └──────────┬───────────┘
//!            │ Transport (trait)
//! ┌──────────▼───────────┐
//! │ HttpTransport        │  reqwest, plain or mutual TLS
//! └──────────┬───────────┘
//!            │ HTTPS
//! ┌──────────▼───────────┐
//! │ Control service /v1  │
//! └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use flocker_client::{ControlServiceClient, ControlServiceConfig, DatasetApi};
//! use flocker_core::DatasetName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ControlServiceConfig::from_env()?;
//! let client = ControlServiceClient::from_config(&config, true)?;
//!
//! let id = client
//!     .find_configuration_id_by_name(&DatasetName::new("postgres-data")?)
//!     .await?;
//! let state = client.get_state(&id).await?;
//! println!("mounted at {}", state.path.display());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod transport;
pub mod types;

pub use client::{ControlServiceClient, DatasetApi};
pub use config::{env_or_fallback, ConnectionParams, ControlServiceConfig, Scheme, TlsFiles};
pub use error::{ClientError, LookupKind, Result};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};
pub use types::{DatasetConfiguration, DatasetState};
