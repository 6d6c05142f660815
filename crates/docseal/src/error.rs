//! Error types for the exchange layer.

use docseal_core::CryptoError;
use docseal_store::StoreError;
use thiserror::Error;

/// Errors that can occur during exchange operations.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Cryptographic or record-format error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Missing directory entry, wrapped key, or blob.
    #[error("not found: {0}")]
    NotFound(String),

    /// The session's role lacks the capability for this operation.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The envelope is addressed to a different identity.
    #[error("envelope is not addressed to this identity")]
    NotRecipient,

    /// A blocking crypto task failed to complete.
    #[error("task failed: {0}")]
    Task(String),
}

impl ExchangeError {
    /// True for failures that mean "this document could not be decrypted".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, ExchangeError::Crypto(e) if e.is_integrity_failure())
    }

    /// True when a wrapped key could not be opened with the given password.
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, ExchangeError::Crypto(CryptoError::WrongPasswordOrCorrupted))
    }
}

impl From<tokio::task::JoinError> for ExchangeError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExchangeError::Task(err.to_string())
    }
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
