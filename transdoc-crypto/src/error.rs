//! Crypto error types.

use thiserror::Error;
use uuid::Uuid;

/// Result type for envelope operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the encryption envelope.
///
/// Any of these is fatal for the single request it occurred on; forged or
/// corrupt envelopes are never retried automatically.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("envelope sealed under unknown key {envelope_key}, session key is {session_key}")]
    KeyMismatch {
        envelope_key: Uuid,
        session_key: Uuid,
    },

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
