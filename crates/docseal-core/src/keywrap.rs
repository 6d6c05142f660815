//! Password key-wrap for identity private keys.
//!
//! The PKCS8 encoding of a private key is sealed with AES-256-GCM under a key
//! derived from the user's password with PBKDF2-HMAC-SHA256. The wrapped
//! record carries everything needed to re-derive the key except the password.
//!
//! The GCM authentication tag is stored as its own field rather than appended
//! to the ciphertext. Older records that use the appended layout are still
//! accepted by [`WrappedPrivateKey::from_json`].

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::encoding::{b64, b64_array};
use crate::error::{CryptoError, Result};
use crate::random::random_array;
use crate::record::WrappedKeyRecord;

/// Salt length for PBKDF2.
pub const SALT_SIZE: usize = 16;

/// IV length for the wrapping cipher.
pub const WRAP_IV_SIZE: usize = 12;

/// GCM authentication tag length.
pub const AUTH_TAG_SIZE: usize = 16;

/// PBKDF2 iteration count used for new wraps.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Largest iteration count accepted from a stored record.
pub const MAX_KDF_ITERATIONS: u32 = 10_000_000;

const DERIVED_KEY_SIZE: usize = 32;

/// Hash function used inside PBKDF2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfHash {
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
}

impl KdfHash {
    pub fn as_str(&self) -> &'static str {
        match self {
            KdfHash::Sha256 => "SHA-256",
        }
    }
}

/// Key derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
    pub hash: KdfHash,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_KDF_ITERATIONS,
            hash: KdfHash::Sha256,
        }
    }
}

impl KdfParams {
    /// Parameters with a custom iteration count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }
}

/// A 256-bit key derived from a password. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; DERIVED_KEY_SIZE]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(redacted)")
    }
}

/// Derive a wrapping key from a password and salt.
///
/// Deterministic: the same password, salt, and parameters always give the
/// same key. Iteration counts outside `1..=MAX_KDF_ITERATIONS` are rejected.
pub fn derive_key(password: &str, salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    if params.iterations == 0 {
        return Err(CryptoError::MalformedRecord(
            "kdf iteration count must be positive".into(),
        ));
    }
    if params.iterations > MAX_KDF_ITERATIONS {
        return Err(CryptoError::MalformedRecord(format!(
            "kdf iteration count {} exceeds {}",
            params.iterations, MAX_KDF_ITERATIONS
        )));
    }
    let mut out = [0u8; DERIVED_KEY_SIZE];
    match params.hash {
        KdfHash::Sha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, params.iterations, &mut out)
        }
    }
    let key = DerivedKey(out);
    out.zeroize();
    Ok(key)
}

/// A private key sealed under a password-derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedPrivateKey {
    /// AES-GCM ciphertext of the PKCS8 private key, without the tag.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "b64_array")]
    pub auth_tag: [u8; AUTH_TAG_SIZE],
    #[serde(with = "b64_array")]
    pub iv: [u8; WRAP_IV_SIZE],
    #[serde(with = "b64_array")]
    pub salt: [u8; SALT_SIZE],
    pub kdf_iterations: u32,
    pub kdf_hash: KdfHash,
}

impl WrappedPrivateKey {
    /// The parameters needed to re-derive the wrapping key.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
            hash: self.kdf_hash,
        }
    }

    /// Build a record from ciphertext with the tag appended (the AEAD output
    /// layout).
    pub fn from_combined(
        combined: &[u8],
        iv: [u8; WRAP_IV_SIZE],
        salt: [u8; SALT_SIZE],
        params: KdfParams,
    ) -> Result<Self> {
        if combined.len() < AUTH_TAG_SIZE {
            return Err(CryptoError::MalformedRecord(format!(
                "wrapped key ciphertext shorter than the {}-byte tag",
                AUTH_TAG_SIZE
            )));
        }
        let (ciphertext, tag) = combined.split_at(combined.len() - AUTH_TAG_SIZE);
        let mut auth_tag = [0u8; AUTH_TAG_SIZE];
        auth_tag.copy_from_slice(tag);
        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            auth_tag,
            iv,
            salt,
            kdf_iterations: params.iterations,
            kdf_hash: params.hash,
        })
    }

    fn combined(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.ciphertext.len() + AUTH_TAG_SIZE);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.auth_tag);
        buf
    }

    /// Serialize to the JSON record form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CryptoError::MalformedRecord(format!("JSON encoding failed: {}", e)))
    }

    /// Parse a JSON record, accepting the legacy appended-tag layouts.
    pub fn from_json(json: &str) -> Result<Self> {
        WrappedKeyRecord::parse(json)?.into_wrapped()
    }
}

/// Wrap private key bytes under a password with default parameters.
pub fn wrap_private_key(private_key_der: &[u8], password: &str) -> Result<WrappedPrivateKey> {
    wrap_private_key_with(private_key_der, password, &KdfParams::default())
}

/// Wrap private key bytes under a password.
///
/// A fresh salt and IV are drawn on every call.
pub fn wrap_private_key_with(
    private_key_der: &[u8],
    password: &str,
    params: &KdfParams,
) -> Result<WrappedPrivateKey> {
    let salt: [u8; SALT_SIZE] = random_array()?;
    let iv: [u8; WRAP_IV_SIZE] = random_array()?;
    let key = derive_key(password, &salt, params)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let combined = cipher
        .encrypt(Nonce::from_slice(&iv), private_key_der)
        .map_err(|_| CryptoError::MalformedRecord("key wrap encryption failed".into()))?;

    WrappedPrivateKey::from_combined(&combined, iv, salt, *params)
}

/// Recover private key bytes from a wrapped record.
///
/// A wrong password and a tampered record are indistinguishable; both fail
/// with [`CryptoError::WrongPasswordOrCorrupted`].
pub fn unwrap_private_key(
    wrapped: &WrappedPrivateKey,
    password: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    let key = derive_key(password, &wrapped.salt, &wrapped.kdf_params())?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(&wrapped.iv), wrapped.combined().as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::WrongPasswordOrCorrupted)
}
