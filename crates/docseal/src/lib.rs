//! # docseal
//!
//! End-to-end encrypted document sharing between patients and doctors.
//!
//! ## Overview
//!
//! - **Identity**: each doctor holds an RSA key pair. The public half is
//!   published to a directory; the private half is stored wrapped under a
//!   password and only ever unwrapped on the doctor's client.
//! - **Envelope**: a patient encrypts a document under a fresh content key and
//!   wraps that key to the doctor's published public key.
//! - **Storage**: the directory, wrapped-key store and blob host are all
//!   untrusted; they only ever see public keys and ciphertext.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal::{Exchange, ExchangeConfig, Session};
//! use docseal::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("docseal.db").unwrap();
//!     let exchange = Exchange::new(store, ExchangeConfig::default());
//!
//!     let doctor = Session::doctor("doctor-1");
//!     let patient = Session::patient("patient-7");
//!
//!     exchange.setup_identity(&doctor, "correct-horse-battery").await.unwrap();
//!
//!     let sealed = exchange
//!         .seal(&patient, b"lab results", doctor.identity())
//!         .await
//!         .unwrap();
//!
//!     let opened = exchange
//!         .open(&doctor, &sealed.locator, "correct-horse-battery")
//!         .await
//!         .unwrap();
//!     assert_eq!(opened.plaintext.as_slice(), b"lab results");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docseal::core` - identity keys, password key-wrap, records
//! - `docseal::envelope` - document envelopes
//! - `docseal::store` - storage traits, SQLite and in-memory backends

pub mod config;
pub mod error;
pub mod exchange;
pub mod session;

// Re-export component crates
pub use docseal_core as core;
pub use docseal_envelope as envelope;
pub use docseal_store as store;

pub use config::ExchangeConfig;
pub use error::{ExchangeError, Result};
pub use exchange::{Exchange, OpenedDocument, SealedDocument};
pub use session::{Capability, Role, Session};

// Re-export commonly used types
pub use docseal_core::{
    BlobLocator, CryptoError, IdentityId, IdentityKeyPair, IdentityPrivateKey, IdentityPublicKey,
    KdfParams, PublicKeyRecord, WrappedPrivateKey,
};
pub use docseal_envelope::DocumentEnvelope;
