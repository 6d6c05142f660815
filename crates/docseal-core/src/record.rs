//! Records exchanged with the directory and the wrapped-key store.

use serde::{Deserialize, Serialize};

use crate::encoding::{b64, decode_base64, decode_base64_array};
use crate::error::{CryptoError, Result};
use crate::identity::IdentityPublicKey;
use crate::keywrap::{
    KdfHash, KdfParams, WrappedPrivateKey, AUTH_TAG_SIZE, DEFAULT_KDF_ITERATIONS, SALT_SIZE,
    WRAP_IV_SIZE,
};
use crate::types::IdentityId;

/// A published public key, as the directory stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRecord {
    pub owner_id: IdentityId,
    /// SPKI, DER-encoded.
    #[serde(with = "b64")]
    pub public_key: Vec<u8>,
    pub published_at: i64,
}

impl PublicKeyRecord {
    pub fn new(owner_id: IdentityId, key: &IdentityPublicKey, published_at: i64) -> Self {
        Self {
            owner_id,
            public_key: key.export_spki().to_vec(),
            published_at,
        }
    }

    /// Parse the stored SPKI back into a usable key.
    pub fn decode_public_key(&self) -> Result<IdentityPublicKey> {
        IdentityPublicKey::import_spki(&self.public_key)
    }

    /// BLAKE3 fingerprint of the stored SPKI.
    pub fn fingerprint(&self) -> String {
        blake3::hash(&self.public_key).to_hex().to_string()
    }
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

/// Lenient reader for wrapped-key JSON.
///
/// Besides the current layout it understands two older ones: the tag
/// appended to the ciphertext bytes, and `"<ciphertext>:<tag>"` as two base64
/// halves in one string. Older records also name the ciphertext
/// `encryptedPrivateKey`. Records written before the KDF fields existed used
/// the defaults.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WrappedKeyRecord {
    #[serde(alias = "encryptedPrivateKey")]
    ciphertext: String,
    #[serde(default)]
    auth_tag: Option<String>,
    iv: String,
    salt: String,
    #[serde(default = "default_iterations")]
    kdf_iterations: u32,
    #[serde(default)]
    kdf_hash: KdfHash,
}

impl WrappedKeyRecord {
    pub(crate) fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CryptoError::MalformedRecord(format!("invalid wrapped key: {}", e)))
    }

    pub(crate) fn into_wrapped(self) -> Result<WrappedPrivateKey> {
        let iv = decode_base64_array::<WRAP_IV_SIZE>(&self.iv, "iv")?;
        let salt = decode_base64_array::<SALT_SIZE>(&self.salt, "salt")?;
        let params = KdfParams {
            iterations: self.kdf_iterations,
            hash: self.kdf_hash,
        };

        match self.auth_tag {
            Some(tag) => Ok(WrappedPrivateKey {
                ciphertext: decode_base64(&self.ciphertext)?,
                auth_tag: decode_base64_array::<AUTH_TAG_SIZE>(&tag, "authTag")?,
                iv,
                salt,
                kdf_iterations: params.iterations,
                kdf_hash: params.hash,
            }),
            None => match self.ciphertext.split_once(':') {
                Some((ct, tag)) => Ok(WrappedPrivateKey {
                    ciphertext: decode_base64(ct)?,
                    auth_tag: decode_base64_array::<AUTH_TAG_SIZE>(tag, "authTag")?,
                    iv,
                    salt,
                    kdf_iterations: params.iterations,
                    kdf_hash: params.hash,
                }),
                None => {
                    let combined = decode_base64(&self.ciphertext)?;
                    WrappedPrivateKey::from_combined(&combined, iv, salt, params)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_base64;
    use crate::keywrap::{unwrap_private_key, wrap_private_key_with};

    fn wrapped() -> WrappedPrivateKey {
        wrap_private_key_with(b"legacy secret", "pw", &KdfParams::with_iterations(500)).unwrap()
    }

    #[test]
    fn test_legacy_appended_tag() {
        let w = wrapped();
        let mut combined = w.ciphertext.clone();
        combined.extend_from_slice(&w.auth_tag);
        let json = format!(
            r#"{{"ciphertext":"{}","iv":"{}","salt":"{}","kdfIterations":500}}"#,
            encode_base64(&combined),
            encode_base64(&w.iv),
            encode_base64(&w.salt)
        );

        let parsed = WrappedPrivateKey::from_json(&json).unwrap();
        assert_eq!(parsed, w);
        assert_eq!(unwrap_private_key(&parsed, "pw").unwrap().as_slice(), b"legacy secret");
    }

    #[test]
    fn test_legacy_separator_form() {
        let w = wrapped();
        let json = format!(
            concat!(
                r#"{{"ciphertext":"{}:{}","iv":"{}","salt":"{}","#,
                r#""kdfIterations":500,"kdfHash":"SHA-256"}}"#
            ),
            encode_base64(&w.ciphertext),
            encode_base64(&w.auth_tag),
            encode_base64(&w.iv),
            encode_base64(&w.salt)
        );
        assert_eq!(WrappedPrivateKey::from_json(&json).unwrap(), w);
    }

    #[test]
    fn test_encrypted_private_key_field_name() {
        let w = wrap_private_key_with(b"browser secret", "pw", &KdfParams::default()).unwrap();
        let mut combined = w.ciphertext.clone();
        combined.extend_from_slice(&w.auth_tag);
        let json = format!(
            r#"{{"encryptedPrivateKey":"{}","iv":"{}","salt":"{}"}}"#,
            encode_base64(&combined),
            encode_base64(&w.iv),
            encode_base64(&w.salt)
        );

        let parsed = WrappedPrivateKey::from_json(&json).unwrap();
        assert_eq!(parsed, w);
        assert_eq!(unwrap_private_key(&parsed, "pw").unwrap().as_slice(), b"browser secret");
    }

    #[test]
    fn test_sixteen_byte_iv_rejected() {
        let json = format!(
            r#"{{"encryptedPrivateKey":"{}:{}","iv":"{}","salt":"{}"}}"#,
            encode_base64(b"ciphertext"),
            encode_base64(&[0u8; AUTH_TAG_SIZE]),
            encode_base64(&[0u8; 16]),
            encode_base64(&[0u8; SALT_SIZE])
        );
        assert_eq!(
            WrappedPrivateKey::from_json(&json).unwrap_err(),
            CryptoError::MalformedRecord("iv must be 12 bytes, got 16".into())
        );
    }

    #[test]
    fn test_missing_kdf_fields_use_defaults() {
        let w = wrapped();
        let json = format!(
            r#"{{"ciphertext":"{}","authTag":"{}","iv":"{}","salt":"{}"}}"#,
            encode_base64(&w.ciphertext),
            encode_base64(&w.auth_tag),
            encode_base64(&w.iv),
            encode_base64(&w.salt)
        );
        let parsed = WrappedPrivateKey::from_json(&json).unwrap();
        assert_eq!(parsed.kdf_params(), KdfParams::default());
    }

    #[test]
    fn test_bad_iv_length_rejected() {
        let json = concat!(
            r#"{"ciphertext":"AAAAAAAAAAAAAAAAAAAAAA==","iv":"AQID","#,
            r#""salt":"AAAAAAAAAAAAAAAAAAAAAA=="}"#
        );
        let err = WrappedPrivateKey::from_json(json).unwrap_err();
        assert_eq!(err, CryptoError::MalformedRecord("iv must be 12 bytes, got 3".into()));
    }

    #[test]
    fn test_unknown_kdf_hash_rejected() {
        let w = wrapped();
        let json = w.to_json().unwrap().replace("SHA-256", "SHA-1");
        assert!(matches!(
            WrappedPrivateKey::from_json(&json),
            Err(CryptoError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_public_key_record_json() {
        let record = PublicKeyRecord {
            owner_id: IdentityId::from("doctor-1"),
            public_key: vec![1, 2, 3],
            published_at: 42,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"ownerId":"doctor-1","publicKey":"AQID","publishedAt":42}"#);
        assert!(matches!(record.decode_public_key(), Err(CryptoError::MalformedKey)));
    }
}
