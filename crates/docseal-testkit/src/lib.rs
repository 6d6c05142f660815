//! # docseal Testkit
//!
//! Testing utilities for docseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Known-answer vectors**: published PBKDF2-HMAC-SHA256 and AES-256-GCM
//!   test cases checked against the primitives docseal is built on
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: an exchange over a memory store with a doctor and a
//!   patient session, and cached identity keys
//!
//! ## Known-Answer Vectors
//!
//! ```rust
//! use docseal_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docseal_testkit::fixtures::cached_keypair;
//! use docseal_testkit::generators::plaintext;
//!
//! proptest! {
//!     #[test]
//!     fn open_inverts_create(body in plaintext(4096)) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use docseal_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     fixture.enroll_doctor("correct-horse-battery").await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{cached_keypair, fast_config, init_tracing, second_keypair, TestFixture};
pub use vectors::{aes_gcm_vectors, pbkdf2_vectors, verify_all_vectors, AesGcmVector, Pbkdf2Vector};
