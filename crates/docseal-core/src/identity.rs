//! Identity key management.
//!
//! An identity key pair is the long-lived RSA key pair that represents one
//! recipient's decryption identity. The public half is published to the
//! directory; the private half only ever leaves the client wrapped under a
//! password (see [`crate::keywrap`]).
//!
//! Keys are used with OAEP padding, SHA-256 for both the label hash and MGF1.
//! Interchange encodings are SPKI (public) and PKCS8 (private), DER-encoded.

use std::fmt;

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::encoding::{decode_base64, encode_base64};
use crate::error::{CryptoError, Result};
use crate::random::ensure_entropy;

/// Default modulus size for newly generated identities.
pub const DEFAULT_MODULUS_BITS: usize = 4096;

/// Smallest modulus accepted for generation or import.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Output length of the OAEP hash (SHA-256).
const OAEP_HASH_LEN: usize = 32;

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// The public half of an identity key pair.
///
/// Holds the parsed key together with its SPKI encoding, which is what gets
/// published and fingerprinted.
#[derive(Clone)]
pub struct IdentityPublicKey {
    key: RsaPublicKey,
    spki: Vec<u8>,
}

impl IdentityPublicKey {
    fn from_rsa(key: RsaPublicKey) -> Result<Self> {
        let spki = key
            .to_public_key_der()
            .map_err(|_| CryptoError::MalformedKey)?
            .as_bytes()
            .to_vec();
        Ok(Self { key, spki })
    }

    /// Import a DER-encoded SubjectPublicKeyInfo.
    pub fn import_spki(der: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_der(der).map_err(|_| CryptoError::MalformedKey)?;
        if key.size() * 8 < MIN_MODULUS_BITS {
            return Err(CryptoError::MalformedKey);
        }
        Self::from_rsa(key)
    }

    /// Import a base64 SPKI string (the form the directory stores).
    pub fn from_base64(s: &str) -> Result<Self> {
        let der = decode_base64(s).map_err(|_| CryptoError::MalformedKey)?;
        Self::import_spki(&der)
    }

    /// The DER-encoded SubjectPublicKeyInfo.
    pub fn export_spki(&self) -> &[u8] {
        &self.spki
    }

    /// The SPKI encoding as base64.
    pub fn to_base64(&self) -> String {
        encode_base64(&self.spki)
    }

    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Largest message OAEP(SHA-256) can encrypt under this key.
    pub fn max_wrap_len(&self) -> usize {
        self.key.size().saturating_sub(2 * OAEP_HASH_LEN + 2)
    }

    /// Hex BLAKE3 digest of the SPKI encoding. Safe to log.
    pub fn fingerprint(&self) -> String {
        blake3::hash(&self.spki).to_hex().to_string()
    }

    /// Encrypt a short secret with RSA-OAEP(SHA-256).
    ///
    /// Inputs over [`max_wrap_len`](Self::max_wrap_len) are rejected with
    /// `KeyTooLarge` before any padding is attempted.
    pub fn encrypt_oaep(&self, secret: &[u8]) -> Result<Vec<u8>> {
        let max = self.max_wrap_len();
        if secret.len() > max {
            return Err(CryptoError::KeyTooLarge {
                len: secret.len(),
                max,
            });
        }
        ensure_entropy()?;
        self.key
            .encrypt(&mut OsRng, oaep(), secret)
            .map_err(|_| CryptoError::EntropyFailure)
    }
}

impl PartialEq for IdentityPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.spki == other.spki
    }
}

impl Eq for IdentityPublicKey {}

impl fmt::Debug for IdentityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IdentityPublicKey({} bits, {})",
            self.modulus_bits(),
            &self.fingerprint()[..16]
        )
    }
}

/// The private half of an identity key pair.
///
/// The underlying `rsa` key zeroizes its components on drop.
#[derive(Clone)]
pub struct IdentityPrivateKey(RsaPrivateKey);

impl IdentityPrivateKey {
    /// Import a DER-encoded PKCS8 private key.
    pub fn import_pkcs8(der: &[u8]) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|_| CryptoError::MalformedKey)?;
        if key.size() * 8 < MIN_MODULUS_BITS {
            return Err(CryptoError::MalformedKey);
        }
        Ok(Self(key))
    }

    /// Import a base64 PKCS8 string.
    pub fn from_base64(s: &str) -> Result<Self> {
        let der = Zeroizing::new(decode_base64(s).map_err(|_| CryptoError::MalformedKey)?);
        Self::import_pkcs8(&der)
    }

    /// The DER-encoded PKCS8 private key, in a buffer cleared on drop.
    pub fn export_pkcs8(&self) -> Result<Zeroizing<Vec<u8>>> {
        let doc = self.0.to_pkcs8_der().map_err(|_| CryptoError::MalformedKey)?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> Result<IdentityPublicKey> {
        IdentityPublicKey::from_rsa(self.0.to_public_key())
    }

    /// Decrypt an RSA-OAEP(SHA-256) ciphertext.
    ///
    /// Every failure collapses to `UnwrapFailed`; which padding check failed
    /// is never reported.
    pub fn decrypt_oaep(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.0
            .decrypt_blinded(&mut OsRng, oaep(), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::UnwrapFailed)
    }
}

impl fmt::Debug for IdentityPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityPrivateKey({} bits, redacted)", self.0.size() * 8)
    }
}

/// An identity key pair.
#[derive(Clone)]
pub struct IdentityKeyPair {
    public: IdentityPublicKey,
    private: IdentityPrivateKey,
}

impl IdentityKeyPair {
    /// Generate a fresh key pair with the default 4096-bit modulus.
    pub fn generate() -> Result<Self> {
        Self::generate_with_bits(DEFAULT_MODULUS_BITS)
    }

    /// Generate a fresh key pair with an explicit modulus size.
    ///
    /// Sizes under [`MIN_MODULUS_BITS`] are rejected.
    pub fn generate_with_bits(bits: usize) -> Result<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::MalformedKey);
        }
        ensure_entropy()?;
        let key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|_| CryptoError::EntropyFailure)?;
        let public = IdentityPublicKey::from_rsa(key.to_public_key())?;
        Ok(Self {
            public,
            private: IdentityPrivateKey(key),
        })
    }

    /// Rebuild a key pair from its private half.
    pub fn from_private(private: IdentityPrivateKey) -> Result<Self> {
        let public = private.public_key()?;
        Ok(Self { public, private })
    }

    /// The public half.
    pub fn public_key(&self) -> &IdentityPublicKey {
        &self.public
    }

    /// The private half.
    pub fn private_key(&self) -> &IdentityPrivateKey {
        &self.private
    }

    /// Split into public and private halves.
    pub fn into_parts(self) -> (IdentityPublicKey, IdentityPrivateKey) {
        (self.public, self.private)
    }
}

impl fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKeyPair({:?})", self.public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn keypair() -> &'static IdentityKeyPair {
        static KEYPAIR: OnceLock<IdentityKeyPair> = OnceLock::new();
        KEYPAIR.get_or_init(|| IdentityKeyPair::generate_with_bits(MIN_MODULUS_BITS).unwrap())
    }

    #[test]
    fn test_spki_roundtrip() {
        let public = keypair().public_key();
        let imported = IdentityPublicKey::import_spki(public.export_spki()).unwrap();
        assert_eq!(&imported, public);
        assert_eq!(imported.fingerprint(), public.fingerprint());
    }

    #[test]
    fn test_pkcs8_roundtrip() {
        let private = keypair().private_key();
        let der = private.export_pkcs8().unwrap();
        let imported = IdentityPrivateKey::import_pkcs8(&der).unwrap();
        assert_eq!(&imported.public_key().unwrap(), keypair().public_key());
    }

    #[test]
    fn test_base64_roundtrip() {
        let public = keypair().public_key();
        let recovered = IdentityPublicKey::from_base64(&public.to_base64()).unwrap();
        assert_eq!(&recovered, public);
    }

    #[test]
    fn test_import_garbage_is_malformed() {
        assert_eq!(
            IdentityPublicKey::import_spki(b"not a key").unwrap_err(),
            CryptoError::MalformedKey
        );
        assert_eq!(
            IdentityPrivateKey::import_pkcs8(&[0u8; 64]).unwrap_err(),
            CryptoError::MalformedKey
        );
        assert_eq!(
            IdentityPublicKey::from_base64("%%%").unwrap_err(),
            CryptoError::MalformedKey
        );
    }

    #[test]
    fn test_public_key_is_not_a_private_key() {
        let spki = keypair().public_key().export_spki();
        assert_eq!(
            IdentityPrivateKey::import_pkcs8(spki).unwrap_err(),
            CryptoError::MalformedKey
        );
    }

    #[test]
    fn test_small_modulus_rejected() {
        assert_eq!(
            IdentityKeyPair::generate_with_bits(1024).unwrap_err(),
            CryptoError::MalformedKey
        );
    }

    #[test]
    fn test_oaep_roundtrip() {
        let secret = [0x5au8; 32];
        let ciphertext = keypair().public_key().encrypt_oaep(&secret).unwrap();
        assert_eq!(ciphertext.len(), MIN_MODULUS_BITS / 8);

        let recovered = keypair().private_key().decrypt_oaep(&ciphertext).unwrap();
        assert_eq!(recovered.as_slice(), &secret);
    }

    #[test]
    fn test_oaep_is_randomized() {
        let secret = [1u8; 32];
        let a = keypair().public_key().encrypt_oaep(&secret).unwrap();
        let b = keypair().public_key().encrypt_oaep(&secret).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_max_wrap_len() {
        // 256-byte modulus minus 2 * 32 - 2.
        assert_eq!(keypair().public_key().max_wrap_len(), 190);

        let too_big = vec![0u8; 191];
        assert_eq!(
            keypair().public_key().encrypt_oaep(&too_big).unwrap_err(),
            CryptoError::KeyTooLarge { len: 191, max: 190 }
        );
    }

    #[test]
    fn test_decrypt_garbage_is_uniform() {
        let private = keypair().private_key();
        assert_eq!(private.decrypt_oaep(&[0u8; 256]).unwrap_err(), CryptoError::UnwrapFailed);
        assert_eq!(private.decrypt_oaep(&[1u8; 10]).unwrap_err(), CryptoError::UnwrapFailed);
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let debug = format!("{:?}", keypair().private_key());
        assert_eq!(debug, "IdentityPrivateKey(2048 bits, redacted)");
    }
}
