//! Sessions and roles.
//!
//! A [`Session`] names the identity an operation acts as and the role it
//! holds. It is passed explicitly into every exchange call that needs one.

use std::fmt;

use serde::{Deserialize, Serialize};

use docseal_core::IdentityId;

use crate::error::{ExchangeError, Result};

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Publish a public key to the directory.
    PublishKey,
    /// Encrypt a document for someone and upload it.
    UploadEnvelope,
    /// Decrypt envelopes addressed to oneself.
    OpenEnvelope,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::PublishKey => "publish key",
            Capability::UploadEnvelope => "upload envelope",
            Capability::OpenEnvelope => "open envelope",
        };
        f.write_str(name)
    }
}

/// Role of a user in the surrounding system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Receives documents: holds a key pair and opens envelopes.
    Doctor,
    /// Sends documents: encrypts to a doctor's published key.
    Patient,
}

impl Role {
    /// Capabilities granted to this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Doctor => &[Capability::PublishKey, Capability::OpenEnvelope],
            Role::Patient => &[Capability::UploadEnvelope],
        }
    }

    /// Check whether this role holds a capability.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// The identity and role an operation runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: IdentityId,
    role: Role,
}

impl Session {
    pub fn new(identity: impl Into<IdentityId>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    pub fn doctor(identity: impl Into<IdentityId>) -> Self {
        Self::new(identity, Role::Doctor)
    }

    pub fn patient(identity: impl Into<IdentityId>) -> Self {
        Self::new(identity, Role::Patient)
    }

    pub fn identity(&self) -> &IdentityId {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fail with [`ExchangeError::NotAuthorized`] unless the role holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(ExchangeError::NotAuthorized(format!(
                "{:?} {} may not {}",
                self.role, self.identity, capability
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_capabilities() {
        assert!(Role::Doctor.can(Capability::PublishKey));
        assert!(Role::Doctor.can(Capability::OpenEnvelope));
        assert!(!Role::Doctor.can(Capability::UploadEnvelope));
    }

    #[test]
    fn test_patient_capabilities() {
        assert!(Role::Patient.can(Capability::UploadEnvelope));
        assert!(!Role::Patient.can(Capability::PublishKey));
        assert!(!Role::Patient.can(Capability::OpenEnvelope));
    }

    #[test]
    fn test_require() {
        let patient = Session::patient("patient-7");
        assert!(patient.require(Capability::UploadEnvelope).is_ok());

        let err = patient.require(Capability::OpenEnvelope).unwrap_err();
        match err {
            ExchangeError::NotAuthorized(msg) => {
                assert_eq!(msg, "Patient patient-7 may not open envelope")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_session_accessors() {
        let session = Session::doctor(IdentityId::from("doctor-1"));
        assert_eq!(session.identity().as_str(), "doctor-1");
        assert_eq!(session.role(), Role::Doctor);
    }
}
