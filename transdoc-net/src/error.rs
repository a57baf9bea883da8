//! Transport error types.

use thiserror::Error;
use transdoc_crypto::CryptoError;
use transdoc_model::DomainError;

/// Result type for server-side transport operations.
pub type NetResult<T> = Result<T, NetError>;

/// Failures of the transport machinery itself.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("frame codec failure: {0}")]
    Codec(String),

    #[error("connection closed")]
    ConnectionClosed,
}

impl From<serde_json::Error> for NetError {
    fn from(err: serde_json::Error) -> Self {
        NetError::Codec(err.to_string())
    }
}

/// What a [`Client::send`](crate::Client::send) caller can observe.
///
/// `Domain` means the command reached the server intact and was rejected
/// by domain logic; every other variant means it may never have been
/// executed at all.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("frame codec failure: {0}")]
    Codec(String),

    #[error("no response within the request timeout")]
    Timeout,

    #[error(transparent)]
    Domain(DomainError),

    #[error("connection closed")]
    ConnectionClosed,
}

impl From<NetError> for ClientError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::Io(e) => ClientError::Io(e),
            NetError::Crypto(e) => ClientError::Crypto(e),
            NetError::Codec(e) => ClientError::Codec(e),
            NetError::ConnectionClosed => ClientError::ConnectionClosed,
        }
    }
}
