//! Content encryption.
//!
//! AES-256-GCM with a per-document key and a 96-bit IV drawn inside
//! [`encrypt_content`]. The ciphertext carries the 16-byte tag at its end.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use docseal_core::encoding::b64_array;
use docseal_core::random::random_array;
use docseal_core::{CryptoError, Result};

/// Content key length in bytes.
pub const CONTENT_KEY_SIZE: usize = 32;

/// IV length in bytes.
pub const CONTENT_IV_SIZE: usize = 12;

/// A 256-bit symmetric key for one document.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKey([u8; CONTENT_KEY_SIZE]);

impl ContentKey {
    /// Generate a new random key.
    pub fn generate() -> Result<Self> {
        Ok(Self(random_array()?))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; CONTENT_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_KEY_SIZE] {
        &self.0
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey(redacted)")
    }
}

/// A 96-bit IV for AES-GCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIv(#[serde(with = "b64_array")] [u8; CONTENT_IV_SIZE]);

impl ContentIv {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; CONTENT_IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; CONTENT_IV_SIZE] {
        &self.0
    }
}

/// Encrypt a document body under `key` with a freshly drawn IV.
pub fn encrypt_content(plaintext: &[u8], key: &ContentKey) -> Result<(Vec<u8>, ContentIv)> {
    let iv = ContentIv(random_array()?);
    let ciphertext = key
        .cipher()
        .encrypt(Nonce::from_slice(&iv.0), plaintext)
        .map_err(|_| CryptoError::MalformedRecord("document too large to encrypt".into()))?;
    Ok((ciphertext, iv))
}

/// Decrypt and verify a document body.
///
/// Either the whole plaintext is returned or nothing is.
pub fn decrypt_content(
    ciphertext: &[u8],
    key: &ContentKey,
    iv: &ContentIv,
) -> Result<Zeroizing<Vec<u8>>> {
    key.cipher()
        .decrypt(Nonce::from_slice(&iv.0), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::IntegrityViolation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = ContentKey::generate().unwrap();
        let (ct, iv) = encrypt_content(b"hello-doc", &key).unwrap();
        assert_eq!(ct.len(), b"hello-doc".len() + 16);
        assert_eq!(decrypt_content(&ct, &key, &iv).unwrap().as_slice(), b"hello-doc");
    }

    #[test]
    fn test_empty_plaintext() {
        let key = ContentKey::generate().unwrap();
        let (ct, iv) = encrypt_content(b"", &key).unwrap();
        assert_eq!(ct.len(), 16);
        assert!(decrypt_content(&ct, &key, &iv).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = ContentKey::generate().unwrap();
        let other = ContentKey::generate().unwrap();
        let (ct, iv) = encrypt_content(b"secret", &key).unwrap();
        assert_eq!(
            decrypt_content(&ct, &other, &iv).unwrap_err(),
            CryptoError::IntegrityViolation
        );
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = ContentKey::generate().unwrap();
        let (ct, iv) = encrypt_content(b"secret", &key).unwrap();
        assert_eq!(
            decrypt_content(&ct[..ct.len() - 1], &key, &iv).unwrap_err(),
            CryptoError::IntegrityViolation
        );
    }

    #[test]
    fn test_fresh_iv_each_call() {
        let key = ContentKey::generate().unwrap();
        let (ct1, iv1) = encrypt_content(b"same", &key).unwrap();
        let (ct2, iv2) = encrypt_content(b"same", &key).unwrap();
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_content_key_debug_redacted() {
        let key = ContentKey::from_bytes([7; 32]);
        assert_eq!(format!("{:?}", key), "ContentKey(redacted)");
    }
}
