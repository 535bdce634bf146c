pub mod jwt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::accountmodel::UserRole;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid or expired credential")]
    InvalidCredential,
    #[error("subject {0} is disabled")]
    SubjectDisabled(Uuid),
    #[error("unknown subject {0}")]
    UnknownSubject(Uuid),
    #[error("an identity with this email already exists")]
    EmailTaken,
    #[error("email or password is wrong")]
    WrongCredentials,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
}

/// Outcome of verifying a bearer credential: the stable subject id plus the
/// role claim attached to the credential, when the provider carries one.
#[derive(Debug, Clone)]
pub struct VerifiedSubject {
    pub subject_id: Uuid,
    pub role_claim: Option<UserRole>,
}

/// External identity system: credential verification, account provisioning,
/// role claims and disabling. Authorization itself never lives here; the
/// stored profile is what the permission checks read.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedSubject, IdentityError>;
    async fn create_account(&self, identity: NewIdentity) -> Result<Uuid, IdentityError>;
    async fn set_claims(&self, subject_id: Uuid, role: UserRole) -> Result<(), IdentityError>;
    async fn disable(&self, subject_id: Uuid) -> Result<(), IdentityError>;
}
