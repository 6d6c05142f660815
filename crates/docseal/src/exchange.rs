//! The Exchange: key directory, password-wrapped identities, and sealed
//! envelopes over a [`Store`].
//!
//! Document lifecycle:
//!
//! ```text
//! plaintext ──seal──▶ SealedDocument (blob stored) ──open──▶ OpenedDocument
//! ```
//!
//! Key generation, PBKDF2 and RSA run on the blocking pool so a slow
//! derivation never stalls the runtime.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use docseal_core::{
    now_millis, unwrap_private_key, wrap_private_key_with, BlobLocator, IdentityId,
    IdentityKeyPair, IdentityPrivateKey, IdentityPublicKey, PublicKeyRecord, Zeroizing,
};
use docseal_envelope::DocumentEnvelope;
use docseal_store::Store;

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::session::{Capability, Session};

/// Run CPU-bound crypto on the blocking pool.
async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> docseal_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// An envelope that has been written to the blob store.
#[derive(Debug, Clone)]
pub struct SealedDocument {
    pub locator: BlobLocator,
    pub envelope: DocumentEnvelope,
}

/// A decrypted document. The plaintext is wiped on drop.
pub struct OpenedDocument {
    pub locator: BlobLocator,
    pub sender_id: IdentityId,
    pub created_at: i64,
    pub plaintext: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for OpenedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedDocument")
            .field("locator", &self.locator)
            .field("sender_id", &self.sender_id)
            .field("created_at", &self.created_at)
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}

/// The main Exchange struct.
///
/// Provides a unified API for:
/// - Publishing and looking up identity public keys
/// - Creating, unlocking and re-passwording identities
/// - Sealing documents for a recipient and opening them
pub struct Exchange<S: Store> {
    store: Arc<S>,
    config: ExchangeConfig,
}

impl<S: Store> Clone for Exchange<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: Store> Exchange<S> {
    /// Create a new exchange over a store.
    pub fn new(store: S, config: ExchangeConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create an exchange over a store shared with other owners.
    pub fn with_shared_store(store: Arc<S>, config: ExchangeConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Directory
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish `public_key` as the session identity's current key.
    ///
    /// Replaces any earlier key. Envelopes already sealed to the old key can
    /// only be opened with the old private key.
    pub async fn publish(
        &self,
        session: &Session,
        public_key: &IdentityPublicKey,
    ) -> Result<PublicKeyRecord> {
        session.require(Capability::PublishKey)?;

        let owner = session.identity();
        let record = PublicKeyRecord::new(owner.clone(), public_key, now_millis());
        let previous = self.store.get_public_key(owner).await?;

        self.store.put_public_key(&record).await?;

        match previous {
            Some(old) if old.public_key != record.public_key => info!(
                identity = %owner,
                old_fingerprint = %old.fingerprint(),
                new_fingerprint = %record.fingerprint(),
                "replaced published key"
            ),
            Some(_) => debug!(identity = %owner, "republished unchanged key"),
            None => info!(
                identity = %owner,
                fingerprint = %record.fingerprint(),
                "published key"
            ),
        }
        Ok(record)
    }

    /// Fetch the current public key of an identity.
    pub async fn lookup(&self, identity: &IdentityId) -> Result<IdentityPublicKey> {
        let record = self
            .store
            .get_public_key(identity)
            .await?
            .ok_or_else(|| ExchangeError::NotFound(format!("public key for {}", identity)))?;
        Ok(record.decode_public_key()?)
    }

    /// Check whether an identity has published a key.
    pub async fn has_published_key(&self, identity: &IdentityId) -> Result<bool> {
        Ok(self.store.get_public_key(identity).await?.is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity keys
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate a key pair for the session identity, store the private half
    /// wrapped under `password`, and publish the public half.
    ///
    /// Running this again regenerates: both records are overwritten and
    /// earlier envelopes become unreadable with the new key.
    ///
    /// The wrapped key is written before the public key is published. If
    /// publishing fails, the previous wrapped key is put back so the stored
    /// private key keeps matching the directory. A failure during that
    /// restore is logged and the publish error is still returned; the
    /// identity then needs `setup_identity` again.
    pub async fn setup_identity(
        &self,
        session: &Session,
        password: &str,
    ) -> Result<IdentityPublicKey> {
        session.require(Capability::PublishKey)?;

        let bits = self.config.rsa_bits;
        let kdf = self.config.kdf;
        let password = Zeroizing::new(password.to_owned());
        let (public_key, wrapped) = blocking(move || {
            let pair = IdentityKeyPair::generate_with_bits(bits)?;
            let der = pair.private_key().export_pkcs8()?;
            let wrapped = wrap_private_key_with(&der, &password, &kdf)?;
            let (public_key, _) = pair.into_parts();
            Ok((public_key, wrapped))
        })
        .await?;

        let previous = self.store.get_wrapped_key(session.identity()).await?;
        self.store.put_wrapped_key(session.identity(), &wrapped).await?;
        if let Err(err) = self.publish(session, &public_key).await {
            if let Some(previous) = previous {
                let restored = self.store.put_wrapped_key(session.identity(), &previous).await;
                if let Err(restore) = restored {
                    warn!(
                        identity = %session.identity(),
                        error = %restore,
                        "could not restore previous wrapped key"
                    );
                }
            }
            return Err(err);
        }

        info!(
            identity = %session.identity(),
            bits = public_key.modulus_bits(),
            "identity set up"
        );
        Ok(public_key)
    }

    /// Recover the session identity's private key with its password.
    pub async fn unlock(&self, session: &Session, password: &str) -> Result<IdentityPrivateKey> {
        session.require(Capability::OpenEnvelope)?;

        let owner = session.identity();
        let wrapped = self
            .store
            .get_wrapped_key(owner)
            .await?
            .ok_or_else(|| ExchangeError::NotFound(format!("wrapped key for {}", owner)))?;

        let password = Zeroizing::new(password.to_owned());
        let unlocked = blocking(move || {
            let der = unwrap_private_key(&wrapped, &password)?;
            IdentityPrivateKey::import_pkcs8(&der)
        })
        .await;

        match &unlocked {
            Ok(_) => debug!(identity = %owner, "unlocked identity"),
            Err(e) if e.is_wrong_password() => warn!(identity = %owner, "unlock failed"),
            Err(_) => {}
        }
        unlocked
    }

    /// Re-wrap the session identity's private key under a new password.
    ///
    /// The key pair and the published key are unchanged; a fresh salt and IV
    /// are drawn for the new wrap.
    pub async fn change_password(&self, session: &Session, old: &str, new: &str) -> Result<()> {
        session.require(Capability::PublishKey)?;

        let owner = session.identity();
        let wrapped = self
            .store
            .get_wrapped_key(owner)
            .await?
            .ok_or_else(|| ExchangeError::NotFound(format!("wrapped key for {}", owner)))?;

        let kdf = self.config.kdf;
        let old = Zeroizing::new(old.to_owned());
        let new = Zeroizing::new(new.to_owned());
        let rewrapped = blocking(move || {
            let der = unwrap_private_key(&wrapped, &old)?;
            IdentityPrivateKey::import_pkcs8(&der)?;
            wrap_private_key_with(&der, &new, &kdf)
        })
        .await?;

        self.store.put_wrapped_key(owner, &rewrapped).await?;
        info!(identity = %owner, "password changed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Envelopes
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt `plaintext` for `recipient` without storing it.
    ///
    /// Fails with [`ExchangeError::NotFound`] if the recipient has no
    /// published key; nothing is encrypted in that case.
    pub async fn create_envelope(
        &self,
        session: &Session,
        plaintext: &[u8],
        recipient: &IdentityId,
    ) -> Result<DocumentEnvelope> {
        session.require(Capability::UploadEnvelope)?;

        let recipient_key = self.lookup(recipient).await?;
        let sender = session.identity().clone();
        let recipient = recipient.clone();
        let plaintext = Zeroizing::new(plaintext.to_vec());

        blocking(move || {
            DocumentEnvelope::create(&plaintext, sender, recipient, &recipient_key)
        })
        .await
    }

    /// Encrypt `plaintext` for `recipient` and write the envelope to the
    /// blob store.
    ///
    /// The blob write is the last step, so any earlier failure leaves
    /// nothing behind.
    pub async fn seal(
        &self,
        session: &Session,
        plaintext: &[u8],
        recipient: &IdentityId,
    ) -> Result<SealedDocument> {
        let envelope = self.create_envelope(session, plaintext, recipient).await?;
        let bytes = envelope.to_bytes()?;
        let len = bytes.len();
        let locator = self.store.put_blob(Bytes::from(bytes)).await?;

        info!(
            sender = %envelope.sender_id,
            recipient = %envelope.recipient_id,
            locator = %locator,
            len,
            "sealed document"
        );
        Ok(SealedDocument { locator, envelope })
    }

    /// Decrypt an envelope addressed to the session identity.
    pub async fn open_envelope(
        &self,
        session: &Session,
        envelope: &DocumentEnvelope,
        private_key: &IdentityPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        session.require(Capability::OpenEnvelope)?;
        if &envelope.recipient_id != session.identity() {
            return Err(ExchangeError::NotRecipient);
        }

        let envelope = envelope.clone();
        let private_key = private_key.clone();
        blocking(move || envelope.open(&private_key)).await
    }

    /// Fetch, unlock and decrypt a stored document.
    ///
    /// The password is checked before any content decryption, so a wrong
    /// password fails with `WrongPasswordOrCorrupted` and never with an
    /// integrity error.
    pub async fn open(
        &self,
        session: &Session,
        locator: &BlobLocator,
        password: &str,
    ) -> Result<OpenedDocument> {
        session.require(Capability::OpenEnvelope)?;

        let bytes = self
            .store
            .get_blob(locator)
            .await?
            .ok_or_else(|| ExchangeError::NotFound(format!("blob {}", locator)))?;
        let envelope = DocumentEnvelope::from_bytes(&bytes)?;
        if &envelope.recipient_id != session.identity() {
            return Err(ExchangeError::NotRecipient);
        }

        let private_key = self.unlock(session, password).await?;
        let plaintext = match self.open_envelope(session, &envelope, &private_key).await {
            Ok(plaintext) => plaintext,
            Err(e) => {
                if e.is_integrity_failure() {
                    warn!(locator = %locator, "document failed integrity check");
                }
                return Err(e);
            }
        };

        debug!(locator = %locator, len = plaintext.len(), "opened document");
        Ok(OpenedDocument {
            locator: locator.clone(),
            sender_id: envelope.sender_id,
            created_at: envelope.created_at,
            plaintext,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::CryptoError;
    use docseal_store::{BlobStore, Directory, MemoryStore};

    fn exchange() -> Exchange<MemoryStore> {
        Exchange::new(
            MemoryStore::new(),
            ExchangeConfig::default().rsa_bits(2048).kdf_iterations(1_000),
        )
    }

    #[tokio::test]
    async fn test_lookup_unpublished_is_not_found() {
        let ex = exchange();
        let err = ex.lookup(&IdentityId::from("doctor-x")).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
        assert!(!ex.has_published_key(&IdentityId::from("doctor-x")).await.unwrap());
    }

    #[tokio::test]
    async fn test_seal_to_unpublished_writes_nothing() {
        let ex = exchange();
        let patient = Session::patient("patient-b");
        let err = ex
            .seal(&patient, b"hello-doc", &IdentityId::from("doctor-x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
        assert_eq!(ex.store().blob_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_role_checks_run_first() {
        let ex = exchange();
        let doctor = Session::doctor("doctor-a");
        let patient = Session::patient("patient-b");

        let err = ex
            .seal(&doctor, b"x", &IdentityId::from("doctor-a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotAuthorized(_)));

        let err = ex.setup_identity(&patient, "pw").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotAuthorized(_)));

        let err = ex.unlock(&patient, "pw").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn test_unlock_without_wrapped_key_is_not_found() {
        let ex = exchange();
        let err = ex.unlock(&Session::doctor("doctor-a"), "pw").await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_missing_blob_is_not_found() {
        let ex = exchange();
        let locator = BlobLocator::for_content(b"nothing here");
        let err = ex
            .open(&Session::doctor("doctor-a"), &locator, "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_garbage_blob_is_malformed() {
        let ex = exchange();
        let locator = ex
            .store()
            .put_blob(Bytes::from_static(b"\xa0"))
            .await
            .unwrap();
        let err = ex
            .open(&Session::doctor("doctor-a"), &locator, "pw")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Crypto(CryptoError::MalformedRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_directory_entry_is_malformed_key() {
        let ex = exchange();
        ex.store()
            .put_public_key(&PublicKeyRecord {
                owner_id: IdentityId::from("doctor-a"),
                public_key: vec![0x30, 0x00],
                published_at: 0,
            })
            .await
            .unwrap();
        let err = ex.lookup(&IdentityId::from("doctor-a")).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Crypto(CryptoError::MalformedKey)));
    }
}
