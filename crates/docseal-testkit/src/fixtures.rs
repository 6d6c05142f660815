//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. RSA key generation is the slow
//! part of every scenario, so identity keys are generated once per process
//! and shared.

use std::sync::OnceLock;

use docseal::{Exchange, ExchangeConfig, Session};
use docseal_core::{
    wrap_private_key_with, IdentityKeyPair, IdentityPublicKey, MIN_MODULUS_BITS,
};
use docseal_store::{MemoryStore, Store, WrappedKeyStore};

/// PBKDF2 iterations used by fixtures. Far below the production default.
pub const FAST_KDF_ITERATIONS: u32 = 1_000;

/// A 2048-bit identity key pair, generated once per test binary.
pub fn cached_keypair() -> &'static IdentityKeyPair {
    static KEY: OnceLock<IdentityKeyPair> = OnceLock::new();
    KEY.get_or_init(|| {
        IdentityKeyPair::generate_with_bits(MIN_MODULUS_BITS).expect("key generation")
    })
}

/// A second, unrelated key pair.
pub fn second_keypair() -> &'static IdentityKeyPair {
    static KEY: OnceLock<IdentityKeyPair> = OnceLock::new();
    KEY.get_or_init(|| {
        IdentityKeyPair::generate_with_bits(MIN_MODULUS_BITS).expect("key generation")
    })
}

/// Exchange configuration with small keys and cheap key derivation.
pub fn fast_config() -> ExchangeConfig {
    ExchangeConfig::default()
        .rsa_bits(MIN_MODULUS_BITS)
        .kdf_iterations(FAST_KDF_ITERATIONS)
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// An exchange with one doctor and one patient session.
pub struct TestFixture<S: Store = MemoryStore> {
    pub exchange: Exchange<S>,
    pub doctor: Session,
    pub patient: Session,
}

impl TestFixture<MemoryStore> {
    /// Create a fixture over an empty memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> TestFixture<S> {
    /// Create a fixture over the given store.
    pub fn with_store(store: S) -> Self {
        Self {
            exchange: Exchange::new(store, fast_config()),
            doctor: Session::doctor("doctor-a"),
            patient: Session::patient("patient-b"),
        }
    }

    /// Store the cached key pair as the doctor's identity, wrapped under
    /// `password`, and publish it. Skips key generation.
    pub async fn enroll_doctor(&self, password: &str) -> docseal::Result<IdentityPublicKey> {
        let keypair = cached_keypair();
        let der = keypair.private_key().export_pkcs8()?;
        let wrapped = wrap_private_key_with(&der, password, &fast_config().kdf)?;

        self.exchange
            .store()
            .put_wrapped_key(self.doctor.identity(), &wrapped)
            .await?;
        self.exchange.publish(&self.doctor, keypair.public_key()).await?;
        Ok(keypair.public_key().clone())
    }
}
