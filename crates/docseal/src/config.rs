//! Exchange configuration.

use docseal_core::{KdfParams, DEFAULT_MODULUS_BITS};

/// Configuration for the [`Exchange`](crate::Exchange).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Modulus size for newly generated identity keys.
    pub rsa_bits: usize,
    /// Key derivation parameters for new password wraps.
    pub kdf: KdfParams,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rsa_bits: DEFAULT_MODULUS_BITS,
            kdf: KdfParams::default(),
        }
    }
}

impl ExchangeConfig {
    /// Set the identity key modulus size.
    pub fn rsa_bits(mut self, bits: usize) -> Self {
        self.rsa_bits = bits;
        self
    }

    /// Set the PBKDF2 iteration count for new wraps.
    ///
    /// Existing wrapped keys keep the count they were written with.
    pub fn kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf.iterations = iterations;
        self
    }
}
