//! Connection parameters for the control service.
//!
//! The location of the service comes from the environment of the node
//! running the plugin:
//!
//! - `FLOCKER_CONTROL_SERVICE_HOST`
//! - `FLOCKER_CONTROL_SERVICE_PORT`
//!
//! With mutual TLS, the certificate locations may be overridden with:
//!
//! - `FLOCKER_CONTROL_SERVICE_CA_FILE`
//! - `FLOCKER_CONTROL_SERVICE_CLIENT_KEY_FILE`
//! - `FLOCKER_CONTROL_SERVICE_CLIENT_CERT_FILE`

use std::fmt;
use std::path::PathBuf;

use crate::error::{ClientError, Result};

/// Environment variable holding the control service host.
pub const ENV_HOST: &str = "FLOCKER_CONTROL_SERVICE_HOST";
/// Environment variable holding the control service port.
pub const ENV_PORT: &str = "FLOCKER_CONTROL_SERVICE_PORT";
/// Environment variable overriding the CA bundle path.
pub const ENV_CA_FILE: &str = "FLOCKER_CONTROL_SERVICE_CA_FILE";
/// Environment variable overriding the client key path.
pub const ENV_CLIENT_KEY_FILE: &str = "FLOCKER_CONTROL_SERVICE_CLIENT_KEY_FILE";
/// Environment variable overriding the client certificate path.
pub const ENV_CLIENT_CERT_FILE: &str = "FLOCKER_CONTROL_SERVICE_CLIENT_CERT_FILE";

const DEFAULT_CA_FILE: &str = "/etc/flocker/cluster.crt";
const DEFAULT_CLIENT_KEY_FILE: &str = "/etc/flocker/apiuser.key";
const DEFAULT_CLIENT_CERT_FILE: &str = "/etc/flocker/apiuser.crt";

/// URL scheme used to reach the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP, for tests and local setups.
    Http,
    /// HTTPS, the control service default.
    #[default]
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Where the control service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// URL scheme.
    pub scheme: Scheme,
    /// Host name or IP address; never empty.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// API version path segment (e.g. `v1`).
    pub api_version: String,
}

impl ConnectionParams {
    /// Create parameters for `host:port` with the default scheme and API version.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if `host` is empty.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let params = Self {
            scheme: Scheme::default(),
            host: host.into(),
            port,
            api_version: "v1".to_string(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse parameters from their textual form, as found in the environment.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if `host` is blank or `port` is
    /// not an integer in the TCP port range. Surrounding whitespace is not
    /// accepted in `port`.
    pub fn parse(host: &str, port: &str) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(empty_host());
        }
        let port = port.parse::<u16>().map_err(|_| {
            ClientError::Configuration(format!("{ENV_PORT} must be a number, got {port:?}"))
        })?;
        Self::new(host, port)
    }

    /// Use a different URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Use a different API version segment.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Check the invariants on fields that may have been set directly.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the host is blank or the API
    /// version is empty.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(empty_host());
        }
        if self.api_version.is_empty() {
            return Err(ClientError::Configuration(
                "API version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL for a path relative to the versioned API root.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}://{}:{}/{}/{}",
            self.scheme,
            self.host,
            self.port,
            self.api_version,
            path.trim_start_matches('/')
        )
    }
}

fn empty_host() -> ClientError {
    ClientError::Configuration(format!("{ENV_HOST} can't be empty"))
}

/// Locations of the PEM files used for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// CA bundle the service certificate must chain to.
    pub ca_file: PathBuf,
    /// Client private key.
    pub client_key_file: PathBuf,
    /// Client certificate.
    pub client_cert_file: PathBuf,
}

impl Default for TlsFiles {
    fn default() -> Self {
        Self {
            ca_file: PathBuf::from(DEFAULT_CA_FILE),
            client_key_file: PathBuf::from(DEFAULT_CLIENT_KEY_FILE),
            client_cert_file: PathBuf::from(DEFAULT_CLIENT_CERT_FILE),
        }
    }
}

/// Everything needed to build a client, as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlServiceConfig {
    /// Service location.
    pub connection: ConnectionParams,
    /// TLS material locations.
    pub tls: TlsFiles,
}

impl ControlServiceConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the host is unset or the port
    /// is not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the host is unset or the port
    /// is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(ENV_HOST).unwrap_or_default();
        let port = lookup(ENV_PORT).unwrap_or_default();
        let connection = ConnectionParams::parse(&host, &port)?;

        let tls = TlsFiles {
            ca_file: value_or_fallback(&lookup, ENV_CA_FILE, DEFAULT_CA_FILE).into(),
            client_key_file: value_or_fallback(&lookup, ENV_CLIENT_KEY_FILE, DEFAULT_CLIENT_KEY_FILE)
                .into(),
            client_cert_file: value_or_fallback(
                &lookup,
                ENV_CLIENT_CERT_FILE,
                DEFAULT_CLIENT_CERT_FILE,
            )
            .into(),
        };

        Ok(Self { connection, tls })
    }
}

/// Value of the environment variable `key` if set and non-empty, otherwise `fallback`.
#[must_use]
pub fn env_or_fallback(key: &str, fallback: &str) -> String {
    value_or_fallback(&|k: &str| std::env::var(k).ok(), key, fallback)
}

fn value_or_fallback<F>(lookup: &F, key: &str, fallback: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn parse_requires_host_and_numeric_port() {
        let cases = [
            ("", "1", false),
            ("   ", "1", false),
            ("host", "fail", false),
            ("host", " 42 ", false),
            ("host", "", false),
            ("host", "-1", false),
            ("host", "70000", false),
            ("host", "1", true),
        ];

        for (host, port, ok) in cases {
            let result = ConnectionParams::parse(host, port);
            assert_eq!(result.is_ok(), ok, "host={host:?} port={port:?}");
            if let Err(err) = result {
                assert!(matches!(err, ClientError::Configuration(_)));
            }
        }
    }

    #[test]
    fn url_joins_versioned_root() {
        let params = ConnectionParams::parse("host", "42").unwrap();
        assert_eq!(params.url("test"), "https://host:42/v1/test");
        assert_eq!(
            params.with_scheme(Scheme::Http).url("/state/datasets"),
            "http://host:42/v1/state/datasets"
        );
    }

    #[test]
    fn validate_catches_direct_field_edits() {
        let mut params = ConnectionParams::new("host", 1).unwrap();
        params.host.clear();
        assert!(params.validate().is_err());
    }

    #[test]
    fn config_from_lookup_uses_tls_defaults() {
        let config = ControlServiceConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "control"),
            (ENV_PORT, "4523"),
            (ENV_CA_FILE, ""),
        ]))
        .unwrap();

        assert_eq!(config.connection.host, "control");
        assert_eq!(config.connection.port, 4523);
        assert_eq!(config.tls, TlsFiles::default());
    }

    #[test]
    fn config_from_lookup_overrides_tls_paths() {
        let config = ControlServiceConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "control"),
            (ENV_PORT, "4523"),
            (ENV_CA_FILE, "/tmp/ca.crt"),
            (ENV_CLIENT_KEY_FILE, "/tmp/user.key"),
            (ENV_CLIENT_CERT_FILE, "/tmp/user.crt"),
        ]))
        .unwrap();

        assert_eq!(config.tls.ca_file, PathBuf::from("/tmp/ca.crt"));
        assert_eq!(config.tls.client_key_file, PathBuf::from("/tmp/user.key"));
        assert_eq!(config.tls.client_cert_file, PathBuf::from("/tmp/user.crt"));
    }

    #[test]
    fn config_from_lookup_missing_host() {
        let err = ControlServiceConfig::from_lookup(lookup_from(&[(ENV_PORT, "1")])).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn env_or_fallback_uses_fallback_when_unset() {
        assert_eq!(
            env_or_fallback("FLOCKER_TEST_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
