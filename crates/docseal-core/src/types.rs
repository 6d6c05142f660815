//! Strong type definitions for docseal.
//!
//! Identifiers are newtypes to prevent mixing them up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CryptoError, Result};

/// Identifier of a user in the surrounding system (a doctor or patient id).
///
/// Opaque to the protocol: it is only ever compared and used as a lookup key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityId({})", self.0)
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IdentityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Locator of a ciphertext blob: the hex BLAKE3 digest of its bytes.
///
/// The address says nothing about integrity; the blob host is untrusted and
/// only the envelope's authentication tag is relied on.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BlobLocator(String);

impl BlobLocator {
    /// Length of the hex-encoded digest.
    pub const HEX_LEN: usize = 64;

    /// Compute the locator for a byte sequence.
    pub fn for_content(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// Parse a locator from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        let valid = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(CryptoError::MalformedRecord(format!(
                "blob locator must be {} lowercase hex characters",
                Self::HEX_LEN
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobLocator({})", self.0.get(..16).unwrap_or(&self.0))
    }
}

impl TryFrom<String> for BlobLocator {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<BlobLocator> for String {
    fn from(locator: BlobLocator) -> Self {
        locator.0
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_id_display() {
        let id = IdentityId::new("doctor-42");
        assert_eq!(id.to_string(), "doctor-42");
        assert_eq!(format!("{:?}", id), "IdentityId(doctor-42)");
    }

    #[test]
    fn test_identity_id_serializes_as_string() {
        let id = IdentityId::from("patient-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""patient-7""#);
    }

    #[test]
    fn test_blob_locator_is_content_address() {
        let a = BlobLocator::for_content(b"ciphertext");
        let b = BlobLocator::for_content(b"ciphertext");
        let c = BlobLocator::for_content(b"other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), BlobLocator::HEX_LEN);
    }

    #[test]
    fn test_blob_locator_parse() {
        let loc = BlobLocator::for_content(b"x");
        assert_eq!(BlobLocator::parse(loc.as_str()).unwrap(), loc);
        assert!(BlobLocator::parse("abc").is_err());
        assert!(BlobLocator::parse(&"G".repeat(64)).is_err());
        assert!(BlobLocator::parse(&loc.as_str().to_uppercase()).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_locator_for_any_content_parses(
            content in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256)
        ) {
            let loc = BlobLocator::for_content(&content);
            proptest::prop_assert_eq!(BlobLocator::parse(loc.as_str()).unwrap(), loc);
        }
    }

    #[test]
    fn test_blob_locator_debug_truncated() {
        let loc = BlobLocator::for_content(b"x");
        let debug = format!("{:?}", loc);
        assert!(debug.starts_with("BlobLocator("));
        assert_eq!(debug.len(), "BlobLocator()".len() + 16);

        let odd = BlobLocator("aéééééééééé".to_string());
        assert_eq!(format!("{:?}", odd), "BlobLocator(aéééééééééé)");
    }

    #[test]
    fn test_blob_locator_serde_validates() {
        let loc = BlobLocator::for_content(b"x");
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, format!("\"{}\"", loc.as_str()));
        assert_eq!(serde_json::from_str::<BlobLocator>(&json).unwrap(), loc);

        assert!(serde_json::from_str::<BlobLocator>(r#""aééééééééé""#).is_err());
        assert!(serde_json::from_str::<BlobLocator>(r#""abc""#).is_err());
    }
}
