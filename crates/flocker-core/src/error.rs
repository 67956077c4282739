//! Common error types shared by the provisioner crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced while building core values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier that must be non-empty was empty.
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    /// The volume spec carries no Flocker volume source.
    #[error("volume spec has no flocker volume source")]
    UnsupportedSource,
}
