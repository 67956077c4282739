//! Control service client error types.

use std::fmt;

use thiserror::Error;

/// A result type using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// What a not-found lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// A dataset configuration, searched by name.
    Configuration,
    /// A dataset state, searched by dataset ID.
    State,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => f.write_str("dataset configuration"),
            Self::State => f.write_str("dataset state"),
        }
    }
}

/// Errors that can occur while talking to the control service.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The connection parameters or TLS material are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("decode error: {0}")]
    Decode(String),

    /// The service answered, but the requested entry is not (yet) there.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What was being looked up.
        kind: LookupKind,
        /// The name or ID that was searched for.
        key: String,
    },

    /// The service answered with a status outside 1xx-2xx.
    #[error("control service rejected request with status {status}: {body}")]
    RemoteRejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
}

impl ClientError {
    /// Returns `true` for the expected "not there yet" condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if repeating the same request might succeed.
    ///
    /// Rejections are never retriable: a conflict on create means another
    /// caller won the race, not that the dataset is ours.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::NotFound { .. })
    }

    pub(crate) fn not_found(kind: LookupKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = ClientError::not_found(LookupKind::State, "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "dataset state not found: abc");
    }

    #[test]
    fn retriable_kinds() {
        assert!(ClientError::Transport("reset".into()).is_retriable());
        assert!(ClientError::not_found(LookupKind::Configuration, "x").is_retriable());
        assert!(!ClientError::Decode("bad".into()).is_retriable());
        assert!(!ClientError::Configuration("no host".into()).is_retriable());
        assert!(!ClientError::RemoteRejected {
            status: 409,
            body: String::new()
        }
        .is_retriable());
    }
}
