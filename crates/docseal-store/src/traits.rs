//! Storage traits: the abstract interface to the three remote stores.
//!
//! The exchange layer is storage-agnostic. Implementations include SQLite
//! (persistent) and in-memory (for tests).

use async_trait::async_trait;
use bytes::Bytes;
use docseal_core::{BlobLocator, IdentityId, PublicKeyRecord, WrappedPrivateKey};

use crate::error::Result;

/// Public key directory: identity id to current public key.
///
/// One active record per identity. Publishing again overwrites; there is no
/// history.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Insert or replace the record for `record.owner_id`.
    async fn put_public_key(&self, record: &PublicKeyRecord) -> Result<()>;

    /// Get the current record for an identity.
    async fn get_public_key(&self, owner: &IdentityId) -> Result<Option<PublicKeyRecord>>;
}

/// Store for password-wrapped private keys, one per identity.
#[async_trait]
pub trait WrappedKeyStore: Send + Sync {
    /// Insert or replace the wrapped key for `owner`.
    async fn put_wrapped_key(&self, owner: &IdentityId, wrapped: &WrappedPrivateKey) -> Result<()>;

    /// Get the wrapped key for `owner`.
    async fn get_wrapped_key(&self, owner: &IdentityId) -> Result<Option<WrappedPrivateKey>>;
}

/// Content-addressed blob storage for encrypted envelopes.
///
/// The blob host is untrusted. Nothing here checks integrity on read; the
/// envelope's authentication tag is the only integrity guarantee.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return their locator. Storing the same bytes twice is
    /// a no-op that returns the same locator.
    async fn put_blob(&self, content: Bytes) -> Result<BlobLocator>;

    /// Fetch the bytes stored under a locator.
    async fn get_blob(&self, locator: &BlobLocator) -> Result<Option<Bytes>>;

    /// Number of stored blobs.
    async fn blob_count(&self) -> Result<u64>;
}

/// Everything the exchange needs from storage.
pub trait Store: Directory + WrappedKeyStore + BlobStore {}

impl<S: Directory + WrappedKeyStore + BlobStore + ?Sized> Store for S {}
