//! # docseal Store
//!
//! Storage abstraction for docseal. The exchange layer talks to three remote
//! stores through traits, with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Directory`] - identity id to current public key
//! - [`WrappedKeyStore`] - identity id to password-wrapped private key
//! - [`BlobStore`] - content-addressed envelope bytes
//! - [`Store`] - all three together
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - in-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use docseal_store::{BlobStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("docseal.db").unwrap();
//!     let locator = store.put_blob(Bytes::from_static(b"envelope")).await.unwrap();
//!     let bytes = store.get_blob(&locator).await.unwrap();
//!     assert!(bytes.is_some());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Upserts**: publishing a key or wrapped key again replaces the old one
//! - **Content addressing**: the same blob bytes always map to the same locator
//! - **Untrusted blobs**: reads are not integrity-checked here

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{BlobStore, Directory, Store, WrappedKeyStore};
