//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use docseal_core::{BlobLocator, IdentityId, PublicKeyRecord, WrappedPrivateKey};

use crate::error::Result;
use crate::traits::{BlobStore, Directory, WrappedKeyStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    public_keys: HashMap<IdentityId, PublicKeyRecord>,
    wrapped_keys: HashMap<IdentityId, WrappedPrivateKey>,
    blobs: HashMap<BlobLocator, Bytes>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the bytes behind a locator without re-addressing them.
    ///
    /// Simulates a misbehaving blob host in tests.
    pub fn replace_blob(&self, locator: &BlobLocator, content: Bytes) -> Result<()> {
        self.inner.write()?.blobs.insert(locator.clone(), content);
        Ok(())
    }

    /// Remove the wrapped key for an identity.
    pub fn remove_wrapped_key(&self, owner: &IdentityId) -> Result<bool> {
        Ok(self.inner.write()?.wrapped_keys.remove(owner).is_some())
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn put_public_key(&self, record: &PublicKeyRecord) -> Result<()> {
        let mut inner = self.inner.write()?;
        inner.public_keys.insert(record.owner_id.clone(), record.clone());
        debug!(owner = %record.owner_id, "stored public key");
        Ok(())
    }

    async fn get_public_key(&self, owner: &IdentityId) -> Result<Option<PublicKeyRecord>> {
        Ok(self.inner.read()?.public_keys.get(owner).cloned())
    }
}

#[async_trait]
impl WrappedKeyStore for MemoryStore {
    async fn put_wrapped_key(&self, owner: &IdentityId, wrapped: &WrappedPrivateKey) -> Result<()> {
        let mut inner = self.inner.write()?;
        inner.wrapped_keys.insert(owner.clone(), wrapped.clone());
        debug!(owner = %owner, "stored wrapped key");
        Ok(())
    }

    async fn get_wrapped_key(&self, owner: &IdentityId) -> Result<Option<WrappedPrivateKey>> {
        Ok(self.inner.read()?.wrapped_keys.get(owner).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put_blob(&self, content: Bytes) -> Result<BlobLocator> {
        let locator = BlobLocator::for_content(&content);
        let len = content.len();
        self.inner
            .write()?
            .blobs
            .entry(locator.clone())
            .or_insert(content);
        debug!(locator = %locator, len, "stored blob");
        Ok(locator)
    }

    async fn get_blob(&self, locator: &BlobLocator) -> Result<Option<Bytes>> {
        Ok(self.inner.read()?.blobs.get(locator).cloned())
    }

    async fn blob_count(&self) -> Result<u64> {
        Ok(self.inner.read()?.blobs.len() as u64)
    }
}
