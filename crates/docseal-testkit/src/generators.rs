//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docseal_core::{IdentityId, KdfParams};

/// Document bodies up to `max_len` bytes, including empty ones.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Printable passwords, including non-ASCII characters.
pub fn password() -> impl Strategy<Value = String> {
    "\\PC{1,32}"
}

/// Identity ids shaped like the surrounding system's user ids.
pub fn identity_id() -> impl Strategy<Value = IdentityId> {
    "(doctor|patient)-[a-z0-9]{1,12}".prop_map(|s| IdentityId::new(s))
}

/// Cheap key derivation parameters.
pub fn kdf_params() -> impl Strategy<Value = KdfParams> {
    (1u32..=64).prop_map(KdfParams::with_iterations)
}

/// Arbitrary secret bytes for key-wrap round trips.
pub fn secret(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::{unwrap_private_key, wrap_private_key_with, CryptoError};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn wrap_unwrap_roundtrip(data in secret(512), pw in password(), params in kdf_params()) {
            let wrapped = wrap_private_key_with(&data, &pw, &params).unwrap();
            let recovered = unwrap_private_key(&wrapped, &pw).unwrap();
            prop_assert_eq!(recovered.as_slice(), data.as_slice());
        }

        #[test]
        fn other_password_fails(
            data in secret(64),
            pw in password(),
            other in password(),
            params in kdf_params(),
        ) {
            prop_assume!(pw != other);
            let wrapped = wrap_private_key_with(&data, &pw, &params).unwrap();
            prop_assert_eq!(
                unwrap_private_key(&wrapped, &other).unwrap_err(),
                CryptoError::WrongPasswordOrCorrupted
            );
        }

        #[test]
        fn identity_ids_are_nonempty(id in identity_id()) {
            prop_assert!(!id.as_str().is_empty());
        }
    }
}
