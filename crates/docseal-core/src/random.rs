//! Secure randomness.
//!
//! Every salt, IV, and key in docseal is drawn from the operating system RNG.
//! There is no fallback source.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, Result};

/// Fill `buf` from the OS random source.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|_| CryptoError::EntropyFailure)
}

/// Draw a fresh random array.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Check that the OS random source is usable.
///
/// `OsRng::fill_bytes` panics if the source fails, and the `rsa` crate draws
/// through it. Probing first turns an unavailable source into `EntropyFailure`.
pub fn ensure_entropy() -> Result<()> {
    random_array::<32>().map(|_| ())
}
