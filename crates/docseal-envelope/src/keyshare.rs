//! Content-key wrapping.
//!
//! The content key of a document is shared with its recipient by encrypting
//! it to the recipient's identity public key with RSA-OAEP(SHA-256).

use serde::{Deserialize, Serialize};

use docseal_core::encoding::b64;
use docseal_core::{CryptoError, IdentityPrivateKey, IdentityPublicKey, Result};

use crate::crypto::{ContentKey, CONTENT_KEY_SIZE};

/// RSA-OAEP ciphertext of a content key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedContentKey(#[serde(with = "b64")] Vec<u8>);

impl WrappedContentKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt arbitrary key bytes to a recipient.
///
/// Fails with [`CryptoError::KeyTooLarge`] when `secret` exceeds the OAEP
/// bound of the recipient's modulus.
pub fn wrap_key_bytes(secret: &[u8], recipient: &IdentityPublicKey) -> Result<WrappedContentKey> {
    recipient.encrypt_oaep(secret).map(WrappedContentKey)
}

/// Encrypt a content key to a recipient.
pub fn wrap_content_key(
    key: &ContentKey,
    recipient: &IdentityPublicKey,
) -> Result<WrappedContentKey> {
    wrap_key_bytes(key.as_bytes(), recipient)
}

/// Recover a content key with the recipient's private key.
///
/// Every failure, including a decrypted length other than 32 bytes, is
/// reported as [`CryptoError::UnwrapFailed`].
pub fn unwrap_content_key(
    wrapped: &WrappedContentKey,
    private_key: &IdentityPrivateKey,
) -> Result<ContentKey> {
    let bytes = private_key.decrypt_oaep(&wrapped.0)?;
    let arr: [u8; CONTENT_KEY_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::UnwrapFailed)?;
    Ok(ContentKey::from_bytes(arr))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use docseal_core::IdentityKeyPair;
    use std::sync::OnceLock;

    pub(crate) fn keypair() -> &'static IdentityKeyPair {
        static KEY: OnceLock<IdentityKeyPair> = OnceLock::new();
        KEY.get_or_init(|| IdentityKeyPair::generate_with_bits(2048).unwrap())
    }

    pub(crate) fn other_keypair() -> &'static IdentityKeyPair {
        static KEY: OnceLock<IdentityKeyPair> = OnceLock::new();
        KEY.get_or_init(|| IdentityKeyPair::generate_with_bits(2048).unwrap())
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let key = ContentKey::generate().unwrap();
        let wrapped = wrap_content_key(&key, keypair().public_key()).unwrap();
        assert_eq!(wrapped.as_bytes().len(), 256);

        let recovered = unwrap_content_key(&wrapped, keypair().private_key()).unwrap();
        assert_eq!(recovered.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let key = ContentKey::generate().unwrap();
        let wrapped = wrap_content_key(&key, keypair().public_key()).unwrap();
        assert_eq!(
            unwrap_content_key(&wrapped, other_keypair().private_key()).unwrap_err(),
            CryptoError::UnwrapFailed
        );
    }

    #[test]
    fn test_wrong_length_payload_fails() {
        let wrapped = wrap_key_bytes(&[1u8; 16], keypair().public_key()).unwrap();
        assert_eq!(
            unwrap_content_key(&wrapped, keypair().private_key()).unwrap_err(),
            CryptoError::UnwrapFailed
        );
    }

    #[test]
    fn test_oversized_input_rejected() {
        let max = keypair().public_key().max_wrap_len();
        let err = wrap_key_bytes(&vec![0u8; max + 1], keypair().public_key()).unwrap_err();
        assert_eq!(err, CryptoError::KeyTooLarge { len: max + 1, max });
    }

    #[test]
    fn test_flipped_bit_fails() {
        let key = ContentKey::generate().unwrap();
        let mut bytes = wrap_content_key(&key, keypair().public_key())
            .unwrap()
            .as_bytes()
            .to_vec();
        bytes[100] ^= 0x01;
        let wrapped = WrappedContentKey::from_bytes(bytes);
        assert_eq!(
            unwrap_content_key(&wrapped, keypair().private_key()).unwrap_err(),
            CryptoError::UnwrapFailed
        );
    }
}
