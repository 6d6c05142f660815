//! Error types for docseal cryptographic operations.
//!
//! Messages never carry key bytes, derived keys, passwords, or plaintext.

use thiserror::Error;

/// Errors that can occur during key, wrap, and envelope operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key material could not be imported or is structurally invalid.
    #[error("malformed key material")]
    MalformedKey,

    /// The password-wrapped private key failed authentication.
    ///
    /// A wrong password and a tampered record are deliberately indistinguishable.
    #[error("wrong password or corrupted key record")]
    WrongPasswordOrCorrupted,

    /// Document ciphertext failed authentication. No plaintext is released.
    #[error("document integrity check failed")]
    IntegrityViolation,

    /// The wrapped content key could not be unwrapped.
    #[error("content key unwrap failed")]
    UnwrapFailed,

    /// The key to wrap exceeds what the recipient's modulus and padding allow.
    #[error("key of {len} bytes exceeds the wrap limit of {max} bytes")]
    KeyTooLarge { len: usize, max: usize },

    /// The secure random source is unavailable.
    #[error("secure random source unavailable")]
    EntropyFailure,

    /// A serialized record (envelope, wrapped key, directory entry) is malformed.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl CryptoError {
    /// Whether this error means ciphertext or a wrapped key failed to authenticate.
    ///
    /// Callers surface both cases as a single "decryption failed".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, CryptoError::IntegrityViolation | CryptoError::UnwrapFailed)
    }
}

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
