//! Document envelope.
//!
//! A [`DocumentEnvelope`] is everything a recipient needs to read one
//! document: the encrypted body, its IV, the content key wrapped to the
//! recipient, and who it is from and for. It is immutable once created.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use docseal_core::encoding::{b64, from_cbor, to_cbor};
use docseal_core::{
    now_millis, CryptoError, IdentityId, IdentityPrivateKey, IdentityPublicKey, Result,
};

use crate::crypto::{decrypt_content, encrypt_content, ContentIv, ContentKey};
use crate::keyshare::{unwrap_content_key, wrap_content_key, WrappedContentKey};

/// Smallest valid ciphertext: an empty body plus the GCM tag.
pub const MIN_CIPHERTEXT_LEN: usize = 16;

/// Algorithm suite of an envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeFormat {
    /// RSA-OAEP(SHA-256) key wrap, AES-256-GCM body.
    #[default]
    #[serde(rename = "RSA-OAEP-256+A256GCM")]
    RsaOaepAes256Gcm,
}

/// An encrypted document addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    pub format: EnvelopeFormat,
    pub wrapped_content_key: WrappedContentKey,
    pub content_iv: ContentIv,
    /// Encrypted body with the 16-byte tag appended.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    pub sender_id: IdentityId,
    pub recipient_id: IdentityId,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl DocumentEnvelope {
    /// Encrypt `plaintext` for `recipient`.
    ///
    /// A new content key and IV are drawn for every envelope.
    pub fn create(
        plaintext: &[u8],
        sender_id: IdentityId,
        recipient_id: IdentityId,
        recipient_key: &IdentityPublicKey,
    ) -> Result<Self> {
        let content_key = ContentKey::generate()?;
        let (ciphertext, content_iv) = encrypt_content(plaintext, &content_key)?;
        let wrapped_content_key = wrap_content_key(&content_key, recipient_key)?;

        Ok(Self {
            format: EnvelopeFormat::RsaOaepAes256Gcm,
            wrapped_content_key,
            content_iv,
            ciphertext,
            sender_id,
            recipient_id,
            created_at: now_millis(),
        })
    }

    /// Decrypt with the recipient's private key.
    ///
    /// Fails with [`CryptoError::UnwrapFailed`] if the key was not wrapped to
    /// this private key and [`CryptoError::IntegrityViolation`] if the body
    /// or IV was altered.
    pub fn open(&self, private_key: &IdentityPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
        match self.format {
            EnvelopeFormat::RsaOaepAes256Gcm => {
                let content_key = unwrap_content_key(&self.wrapped_content_key, private_key)?;
                decrypt_content(&self.ciphertext, &content_key, &self.content_iv)
            }
        }
    }

    /// Size of the encrypted body, tag included.
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len()
    }

    fn validate(self) -> Result<Self> {
        if self.ciphertext.len() < MIN_CIPHERTEXT_LEN {
            return Err(CryptoError::MalformedRecord(format!(
                "ciphertext must be at least {} bytes, got {}",
                MIN_CIPHERTEXT_LEN,
                self.ciphertext.len()
            )));
        }
        if self.wrapped_content_key.as_bytes().is_empty() {
            return Err(CryptoError::MalformedRecord("wrapped content key is empty".into()));
        }
        Ok(self)
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CryptoError::MalformedRecord(format!("JSON encoding failed: {}", e)))
    }

    /// Parse the JSON wire format.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json)
            .map_err(|e| CryptoError::MalformedRecord(format!("invalid envelope: {}", e)))?
            .validate()
    }

    /// Serialize to CBOR bytes for blob storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_cbor::<Self>(bytes)?.validate()
    }
}
