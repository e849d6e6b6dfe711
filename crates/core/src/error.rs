//! Shared error model.

use thiserror::Error;

/// Result type for configuration/document handling.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Failure to obtain or interpret deployed configuration.
///
/// These are per-query failures at the resolver boundary: the caller maps
/// them to a deny outcome, never to a crash. Compile-time invariant
/// violations live in the compiler crate instead.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The policy document could not be read.
    #[error("policy document unreadable: {0}")]
    Unreadable(#[from] std::io::Error),

    /// The policy document was present but not valid JSON for the schema.
    #[error("policy document malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A value failed to parse as a hardware address.
    #[error("invalid hardware address: {0}")]
    InvalidAddress(String),

    /// Key material was missing or unreadable.
    #[error("key material unavailable: {0}")]
    KeyUnavailable(String),
}

impl ConfigurationError {
    pub fn invalid_address(input: impl Into<String>) -> Self {
        Self::InvalidAddress(input.into())
    }

    pub fn key_unavailable(msg: impl Into<String>) -> Self {
        Self::KeyUnavailable(msg.into())
    }
}
