//! Cipher error model.

use thiserror::Error;

/// A cipher call failed. Fatal to that call only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key material did not match `<pad length>:<16 key bytes>`.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Plaintext not encryptable (odd length).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Token structure inconsistent with the block/field format.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

impl CipherError {
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn malformed_token(msg: impl Into<String>) -> Self {
        Self::MalformedToken(msg.into())
    }
}
