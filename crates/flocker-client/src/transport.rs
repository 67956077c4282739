//! Request layer between the client and the network.
//!
//! The [`Transport`] trait is the seam tests substitute. [`HttpTransport`] is
//! the real implementation on top of `reqwest`, either plain or with mutual
//! TLS. Responses are fully buffered before they are returned, so no
//! connection stays borrowed by an unread body on any exit path.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::config::TlsFiles;
use crate::error::{ClientError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP methods used against the control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// JSON body; only present on `POST`.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Build a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Build a `POST` request with `payload` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the payload cannot be serialized.
    pub fn post_json<P: Serialize + ?Sized>(url: impl Into<String>, payload: &P) -> Result<Self> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| ClientError::Decode(format!("failed to encode request body: {e}")))?;
        Ok(Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        })
    }
}

/// A buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 1xx-2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (100..300).contains(&self.status)
    }

    /// The body as text, lossily decoded, for error messages.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the control service.
///
/// Implementations must hold no per-call mutable state so one transport can
/// serve concurrent callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the buffered response.
    ///
    /// A non-success status is not an error at this layer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport without client authentication.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn plain() -> Result<Self> {
        let client = Self::builder()
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Transport authenticating with a client certificate and trusting only
    /// the given CA.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if any PEM file cannot be read or
    /// parsed, or the HTTP client cannot be built.
    pub fn mutual_tls(files: &TlsFiles) -> Result<Self> {
        let ca = reqwest::Certificate::from_pem(&read_pem(&files.ca_file)?)
            .map_err(|e| tls_error(&files.ca_file, &e))?;

        let mut identity_pem = read_pem(&files.client_cert_file)?;
        identity_pem.push(b'\n');
        identity_pem.extend(read_pem(&files.client_key_file)?);
        let identity = reqwest::Identity::from_pem(&identity_pem)
            .map_err(|e| tls_error(&files.client_cert_file, &e))?;

        let client = Self::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .add_root_certificate(ca)
            .identity(identity)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to create TLS client: {e}")))?;

        tracing::debug!(ca = %files.ca_file.display(), "Created mutual TLS transport");
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ClientError::Configuration(format!("failed to read {}: {e}", path.display())))
}

fn tls_error(path: &Path, err: &reqwest::Error) -> ClientError {
    ClientError::Configuration(format!("invalid TLS material in {}: {err}", path.display()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .header(CONTENT_TYPE, "application/json");

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            ClientError::Transport(format!("request to {} failed: {e}", request.url))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            ClientError::Transport(format!("failed to read response from {}: {e}", request.url))
        })?;

        tracing::trace!(url = %request.url, status, "Control service responded");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn success_range_includes_informational() {
        let ok = |status| HttpResponse {
            status,
            body: Vec::new(),
        };
        assert!(ok(100).is_success());
        assert!(ok(201).is_success());
        assert!(!ok(300).is_success());
        assert!(!ok(409).is_success());
    }

    #[test]
    fn only_post_carries_a_body() {
        assert!(HttpRequest::get("http://x/").body.is_none());
        let post = HttpRequest::post_json("http://x/", &serde_json::json!({"test": "foobar"})).unwrap();
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.body.unwrap(), br#"{"test":"foobar"}"#.to_vec());
    }

    #[test]
    fn mutual_tls_missing_files_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = TlsFiles {
            ca_file: dir.path().join("cluster.crt"),
            client_key_file: dir.path().join("apiuser.key"),
            client_cert_file: dir.path().join("apiuser.crt"),
        };

        let err = HttpTransport::mutual_tls(&files).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn mutual_tls_garbage_pem_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let ca_file = dir.path().join("cluster.crt");
        std::fs::File::create(&ca_file)
            .unwrap()
            .write_all(b"not a certificate")
            .unwrap();
        let files = TlsFiles {
            ca_file,
            client_key_file: dir.path().join("apiuser.key"),
            client_cert_file: dir.path().join("apiuser.crt"),
        };

        let err = HttpTransport::mutual_tls(&files).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn post_sends_json_and_returns_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/post"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"test": "foobar"})))
            .respond_with(ResponseTemplate::new(418))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::plain().unwrap();
        let request =
            HttpRequest::post_json(format!("{}/post", server.uri()), &serde_json::json!({"test": "foobar"}))
                .unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 418);
    }

    #[tokio::test]
    async fn get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .mount(&server)
            .await;

        let transport = HttpTransport::plain().unwrap();
        let response = transport
            .send(HttpRequest::get(format!("{}/get", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 418);
        assert_eq!(response.body_text(), "teapot");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let transport = HttpTransport::plain().unwrap();
        let err = transport
            .send(HttpRequest::get(format!(
                "http://127.0.0.1:{port}/v1/state/datasets"
            )))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
    }
}
