//! # docseal Envelope
//!
//! Encrypts one document for one recipient.
//!
//! ## Encryption Model
//!
//! Each document uses a two-layer key model:
//!
//! 1. **Content Key**: a fresh AES-256-GCM key that encrypts the document body
//! 2. **Wrapped Content Key**: the content key encrypted to the recipient's
//!    RSA-OAEP identity key
//!
//! Both layers, the content IV, and the sender and recipient ids travel
//! together in a [`DocumentEnvelope`]. A content key is never reused across
//! documents.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal_core::{IdentityId, IdentityKeyPair};
//! use docseal_envelope::DocumentEnvelope;
//!
//! let doctor = IdentityKeyPair::generate().unwrap();
//! let envelope = DocumentEnvelope::create(
//!     b"lab results",
//!     IdentityId::from("patient-7"),
//!     IdentityId::from("doctor-1"),
//!     doctor.public_key(),
//! )
//! .unwrap();
//!
//! let plaintext = envelope.open(doctor.private_key()).unwrap();
//! assert_eq!(plaintext.as_slice(), b"lab results");
//! ```

pub mod crypto;
pub mod envelope;
pub mod keyshare;

pub use crypto::{decrypt_content, encrypt_content, ContentIv, ContentKey, CONTENT_KEY_SIZE};
pub use envelope::{DocumentEnvelope, EnvelopeFormat, MIN_CIPHERTEXT_LEN};
pub use keyshare::{unwrap_content_key, wrap_content_key, wrap_key_bytes, WrappedContentKey};
