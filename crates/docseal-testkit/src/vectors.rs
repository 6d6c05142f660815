//! Known-answer vectors.
//!
//! Published test cases for the two symmetric primitives docseal depends on:
//! PBKDF2-HMAC-SHA256 (the `"password"`/`"salt"` set) and AES-256-GCM with
//! an all-zero key and IV (GCM test cases 13 and 14).

use serde::Serialize;

use docseal_core::{derive_key, KdfParams};
use docseal_envelope::{decrypt_content, ContentIv, ContentKey};

/// A PBKDF2-HMAC-SHA256 vector with a 32-byte output.
#[derive(Debug, Clone, Serialize)]
pub struct Pbkdf2Vector {
    pub name: &'static str,
    pub password: &'static str,
    pub salt: &'static [u8],
    pub iterations: u32,
    pub expected: &'static str,
}

/// An AES-256-GCM vector, no associated data.
#[derive(Debug, Clone, Serialize)]
pub struct AesGcmVector {
    pub name: &'static str,
    pub key: &'static str,
    pub iv: &'static str,
    pub plaintext: &'static str,
    pub ciphertext: &'static str,
    pub tag: &'static str,
}

pub fn pbkdf2_vectors() -> Vec<Pbkdf2Vector> {
    vec![
        Pbkdf2Vector {
            name: "pbkdf2-sha256 c=1",
            password: "password",
            salt: b"salt",
            iterations: 1,
            expected: "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b",
        },
        Pbkdf2Vector {
            name: "pbkdf2-sha256 c=2",
            password: "password",
            salt: b"salt",
            iterations: 2,
            expected: "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43",
        },
        Pbkdf2Vector {
            name: "pbkdf2-sha256 c=4096",
            password: "password",
            salt: b"salt",
            iterations: 4096,
            expected: "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a",
        },
    ]
}

pub fn aes_gcm_vectors() -> Vec<AesGcmVector> {
    let zero_key = "0000000000000000000000000000000000000000000000000000000000000000";
    let zero_iv = "000000000000000000000000";
    vec![
        AesGcmVector {
            name: "gcm test case 13",
            key: zero_key,
            iv: zero_iv,
            plaintext: "",
            ciphertext: "",
            tag: "530f8afbc74536b9a963b4f1c4cb738b",
        },
        AesGcmVector {
            name: "gcm test case 14",
            key: zero_key,
            iv: zero_iv,
            plaintext: "00000000000000000000000000000000",
            ciphertext: "cea7403d4d606b6e074ec5d3baf39d18",
            tag: "d0d1c8a799996bf0265b98b5d48ab919",
        },
    ]
}

fn decode<const N: usize>(name: &str, field: &str, s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|e| format!("{}: bad {} hex: {}", name, field, e))?;
    bytes
        .try_into()
        .map_err(|_| format!("{}: {} must be {} bytes", name, field, N))
}

/// Check one PBKDF2 vector.
pub fn verify_pbkdf2(vector: &Pbkdf2Vector) -> Result<(), String> {
    let key = derive_key(
        vector.password,
        vector.salt,
        &KdfParams::with_iterations(vector.iterations),
    )
    .map_err(|e| format!("{}: {}", vector.name, e))?;
    let actual = hex::encode(key.as_bytes());
    if actual != vector.expected {
        return Err(format!(
            "{}: expected {}, got {}",
            vector.name, vector.expected, actual
        ));
    }
    Ok(())
}

/// Check one AES-GCM vector by decrypting ciphertext and tag.
pub fn verify_aes_gcm(vector: &AesGcmVector) -> Result<(), String> {
    let key = ContentKey::from_bytes(decode::<32>(vector.name, "key", vector.key)?);
    let iv = ContentIv::from_bytes(decode::<12>(vector.name, "iv", vector.iv)?);

    let mut sealed = hex::decode(vector.ciphertext).map_err(|e| e.to_string())?;
    sealed.extend(hex::decode(vector.tag).map_err(|e| e.to_string())?);

    let plaintext =
        decrypt_content(&sealed, &key, &iv).map_err(|e| format!("{}: {}", vector.name, e))?;
    if hex::encode(plaintext.as_slice()) != vector.plaintext {
        return Err(format!("{}: plaintext mismatch", vector.name));
    }
    Ok(())
}

/// Verify all vectors, reporting the first failure.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in pbkdf2_vectors() {
        verify_pbkdf2(&vector)?;
    }
    for vector in aes_gcm_vectors() {
        verify_aes_gcm(&vector)?;
    }
    Ok(())
}

/// All vectors as JSON, for sharing with other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "pbkdf2": pbkdf2_vectors(),
        "aesGcm": aes_gcm_vectors(),
    }))
}
