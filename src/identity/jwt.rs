// src/identity/jwt.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::identity::{IdentityError, IdentityProvider, NewIdentity, VerifiedSubject};
use crate::models::accountmodel::UserRole;
use crate::utils::{password, token};

#[derive(Debug)]
struct SubjectRecord {
    email: String,
    password_hash: String,
    role_claim: Option<UserRole>,
    disabled: bool,
}

/// Local `IdentityProvider` minting and verifying HS256 bearer tokens.
/// Subject records (password hash, role claim, disabled flag) live in
/// process memory, which is enough for tests and single-node dev runs.
#[derive(Debug)]
pub struct JwtIdentityProvider {
    secret: String,
    maxage_minutes: i64,
    subjects: RwLock<HashMap<Uuid, SubjectRecord>>,
}

impl JwtIdentityProvider {
    pub fn new(secret: impl Into<String>, maxage_minutes: i64) -> Self {
        JwtIdentityProvider {
            secret: secret.into(),
            maxage_minutes,
            subjects: RwLock::new(HashMap::new()),
        }
    }

    // Local login used by the dev seed and tests. Production clients obtain
    // their tokens from the provider directly, so no HTTP route calls this.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let subjects = self.subjects.read().await;
        let (subject_id, record) = subjects
            .iter()
            .find(|(_, record)| record.email.eq_ignore_ascii_case(email))
            .ok_or(IdentityError::WrongCredentials)?;

        if record.disabled {
            return Err(IdentityError::SubjectDisabled(*subject_id));
        }

        let password_matches = password::compare(password, &record.password_hash)
            .map_err(|_| IdentityError::WrongCredentials)?;
        if !password_matches {
            return Err(IdentityError::WrongCredentials);
        }

        token::create_token(
            &subject_id.to_string(),
            self.secret.as_bytes(),
            self.maxage_minutes,
        )
        .map_err(|e| IdentityError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, credential: &str) -> Result<VerifiedSubject, IdentityError> {
        let sub = token::decode_token(credential, self.secret.as_bytes())
            .map_err(|_| IdentityError::InvalidCredential)?;
        let subject_id = Uuid::parse_str(&sub).map_err(|_| IdentityError::InvalidCredential)?;

        let subjects = self.subjects.read().await;
        let record = subjects
            .get(&subject_id)
            .ok_or(IdentityError::UnknownSubject(subject_id))?;

        if record.disabled {
            return Err(IdentityError::SubjectDisabled(subject_id));
        }

        Ok(VerifiedSubject {
            subject_id,
            role_claim: record.role_claim,
        })
    }

    async fn create_account(&self, identity: NewIdentity) -> Result<Uuid, IdentityError> {
        let mut subjects = self.subjects.write().await;
        if subjects
            .values()
            .any(|record| record.email.eq_ignore_ascii_case(&identity.email))
        {
            return Err(IdentityError::EmailTaken);
        }

        let password_hash = password::hash(identity.password)
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let subject_id = Uuid::new_v4();
        subjects.insert(
            subject_id,
            SubjectRecord {
                email: identity.email,
                password_hash,
                role_claim: None,
                disabled: false,
            },
        );
        Ok(subject_id)
    }

    async fn set_claims(&self, subject_id: Uuid, role: UserRole) -> Result<(), IdentityError> {
        let mut subjects = self.subjects.write().await;
        let record = subjects
            .get_mut(&subject_id)
            .ok_or(IdentityError::UnknownSubject(subject_id))?;
        record.role_claim = Some(role);
        Ok(())
    }

    async fn disable(&self, subject_id: Uuid) -> Result<(), IdentityError> {
        let mut subjects = self.subjects.write().await;
        let record = subjects
            .get_mut(&subject_id)
            .ok_or(IdentityError::UnknownSubject(subject_id))?;
        record.disabled = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new("test-secret", 60)
    }

    fn identity(email: &str) -> NewIdentity {
        NewIdentity {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_then_verify_roundtrip() {
        let provider = provider();
        let subject_id = provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();

        let token = provider
            .authenticate("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        let verified = provider.verify(&token).await.unwrap();

        assert_eq!(verified.subject_id, subject_id);
        assert!(verified.role_claim.is_none());
    }

    #[tokio::test]
    async fn test_set_claims_shows_up_on_verify() {
        let provider = provider();
        let subject_id = provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();
        provider
            .set_claims(subject_id, UserRole::Employee)
            .await
            .unwrap();

        let token = provider
            .authenticate("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        let verified = provider.verify(&token).await.unwrap();
        assert_eq!(verified.role_claim, Some(UserRole::Employee));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let provider = provider();
        provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();

        let err = provider.create_account(identity("DEV@example.com")).await;
        assert!(matches!(err, Err(IdentityError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let provider = provider();
        provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();

        let err = provider.authenticate("dev@example.com", "nope-nope").await;
        assert!(matches!(err, Err(IdentityError::WrongCredentials)));
    }

    #[tokio::test]
    async fn test_disabled_subject_fails_verification_and_login() {
        let provider = provider();
        let subject_id = provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();
        let token = provider
            .authenticate("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        provider.disable(subject_id).await.unwrap();

        assert!(matches!(
            provider.verify(&token).await,
            Err(IdentityError::SubjectDisabled(_))
        ));
        assert!(matches!(
            provider.authenticate("dev@example.com", "hunter2hunter2").await,
            Err(IdentityError::SubjectDisabled(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_token_is_rejected() {
        let provider = provider();
        provider
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();

        let other = JwtIdentityProvider::new("other-secret", 60);
        other
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();
        let foreign = other
            .authenticate("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        assert!(matches!(
            provider.verify(&foreign).await,
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn test_token_for_unknown_subject_is_rejected() {
        let signer = provider();
        let subject_id = signer
            .create_account(identity("dev@example.com"))
            .await
            .unwrap();
        let token = signer
            .authenticate("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        // Same secret, empty subject table: signature checks out but the
        // subject does not exist on this provider.
        let empty = JwtIdentityProvider::new("test-secret", 60);
        let err = empty.verify(&token).await;
        match err {
            Err(IdentityError::UnknownSubject(id)) => assert_eq!(id, subject_id),
            other => panic!("expected UnknownSubject, got {:?}", other),
        }
    }
}
