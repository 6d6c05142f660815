//! # docseal Core
//!
//! Pure primitives for the docseal document-sharing protocol: identity keys,
//! password key-wrap, and the wire records exchanged with the directory and
//! wrapped-key store.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over key material.
//!
//! ## Key Types
//!
//! - [`IdentityKeyPair`] - RSA-OAEP(SHA-256) key pair representing a recipient identity
//! - [`WrappedPrivateKey`] - A private key sealed under a password-derived key
//! - [`PublicKeyRecord`] - The directory entry for a published public key
//! - [`IdentityId`] - Opaque identifier of a user in the surrounding system
//! - [`CryptoError`] - The error taxonomy shared by every docseal crate
//!
//! ## Key Hierarchy
//!
//! ```text
//! password ──PBKDF2-SHA256──▶ derived key ──AES-256-GCM──▶ WrappedPrivateKey
//!                                                               │
//!                                                  identity private key (PKCS8)
//!                                                               │
//!                                   RSA-OAEP(SHA-256) unwraps the per-document key
//! ```

pub mod encoding;
pub mod error;
pub mod identity;
pub mod keywrap;
pub mod random;
pub mod record;
pub mod types;

pub use error::{CryptoError, Result};
pub use identity::{
    IdentityKeyPair, IdentityPrivateKey, IdentityPublicKey, DEFAULT_MODULUS_BITS,
    MIN_MODULUS_BITS,
};
pub use keywrap::{
    derive_key, unwrap_private_key, wrap_private_key, wrap_private_key_with, DerivedKey, KdfHash,
    KdfParams, WrappedPrivateKey, AUTH_TAG_SIZE, DEFAULT_KDF_ITERATIONS, MAX_KDF_ITERATIONS,
    SALT_SIZE, WRAP_IV_SIZE,
};
pub use record::PublicKeyRecord;
pub use types::{now_millis, BlobLocator, IdentityId};

/// Re-exported so callers can hold decrypted buffers without a direct dependency.
pub use zeroize::Zeroizing;
