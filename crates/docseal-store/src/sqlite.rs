//! SQLite implementation of the store traits.
//!
//! This is the persistent storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use docseal_core::{now_millis, BlobLocator, IdentityId, PublicKeyRecord, WrappedPrivateKey};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{BlobStore, Directory, WrappedKeyStore};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock()?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl Directory for SqliteStore {
    async fn put_public_key(&self, record: &PublicKeyRecord) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO public_keys (owner_id, public_key, published_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(owner_id) DO UPDATE SET
                    public_key = excluded.public_key,
                    published_at = excluded.published_at,
                    updated_at = excluded.updated_at",
                params![
                    record.owner_id.as_str(),
                    record.public_key,
                    record.published_at,
                    now_millis()
                ],
            )?;
            debug!(owner = %record.owner_id, "stored public key");
            Ok(())
        })
        .await
    }

    async fn get_public_key(&self, owner: &IdentityId) -> Result<Option<PublicKeyRecord>> {
        let owner = owner.clone();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT public_key, published_at FROM public_keys WHERE owner_id = ?1",
                    params![owner.as_str()],
                    |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            Ok(row.map(|(public_key, published_at)| PublicKeyRecord {
                owner_id: owner,
                public_key,
                published_at,
            }))
        })
        .await
    }
}

#[async_trait]
impl WrappedKeyStore for SqliteStore {
    async fn put_wrapped_key(&self, owner: &IdentityId, wrapped: &WrappedPrivateKey) -> Result<()> {
        let owner = owner.clone();
        let json = wrapped
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO wrapped_keys (owner_id, record, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(owner_id) DO UPDATE SET
                    record = excluded.record,
                    updated_at = excluded.updated_at",
                params![owner.as_str(), json, now_millis()],
            )?;
            debug!(owner = %owner, "stored wrapped key");
            Ok(())
        })
        .await
    }

    async fn get_wrapped_key(&self, owner: &IdentityId) -> Result<Option<WrappedPrivateKey>> {
        let owner = owner.clone();
        self.with_conn(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT record FROM wrapped_keys WHERE owner_id = ?1",
                    params![owner.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            json.map(|json| WrappedPrivateKey::from_json(&json).map_err(StoreError::invalid))
                .transpose()
        })
        .await
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn put_blob(&self, content: Bytes) -> Result<BlobLocator> {
        let locator = BlobLocator::for_content(&content);
        let key = locator.clone();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO blobs (locator, content, stored_at) VALUES (?1, ?2, ?3)",
                params![key.as_str(), content.as_ref(), now_millis()],
            )?;
            debug!(locator = %key, len = content.len(), inserted, "stored blob");
            Ok(())
        })
        .await?;
        Ok(locator)
    }

    async fn get_blob(&self, locator: &BlobLocator) -> Result<Option<Bytes>> {
        let locator = locator.clone();
        self.with_conn(move |conn| {
            let content: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT content FROM blobs WHERE locator = ?1",
                    params![locator.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(content.map(Bytes::from))
        })
        .await
    }

    async fn blob_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0))?;
            u64::try_from(count).map_err(|_| StoreError::InvalidData("negative blob count".into()))
        })
        .await
    }
}
