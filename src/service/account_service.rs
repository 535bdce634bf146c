// src/service/account_service.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::dtos::accountdtos::{RegisterAccountDto, UpdateProfileDto};
use crate::identity::{IdentityError, IdentityProvider, NewIdentity, VerifiedSubject};
use crate::models::accountmodel::{Account, UserRole};
use crate::service::error::ServiceError;
use crate::service::projection::project_account_update;
use crate::store::docstore::{DocumentStore, Filter, OrderBy, Query, StoreError};

pub const USERS: &str = "users";

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Two steps: provision the identity, then write the profile keyed by the
    /// subject id. The role claim is applied last and best-effort; a missed
    /// claim is reconciled on the next verified request.
    pub async fn create_account(&self, payload: RegisterAccountDto) -> Result<Account, ServiceError> {
        let subject_id = self
            .identity
            .create_account(NewIdentity {
                email: payload.email.clone(),
                password: payload.password.clone(),
            })
            .await?;

        let now = Utc::now();
        let account = Account {
            id: subject_id,
            email: payload.email,
            display_name: payload.display_name,
            role: payload.role,
            department: payload.department,
            phone_number: payload.phone_number,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store
            .set(USERS, subject_id, serde_json::to_value(&account)?)
            .await?;

        if let Err(e) = self.identity.set_claims(subject_id, account.role).await {
            warn!("role claim for subject {} not applied yet: {}", subject_id, e);
        }

        Ok(account)
    }

    /// Maps a verified credential to the stored profile. The profile's role is
    /// authoritative; when the credential's claim disagrees (or was never
    /// applied) the claim is re-pushed best-effort.
    pub async fn resolve_actor(&self, verified: &VerifiedSubject) -> Result<Account, ServiceError> {
        let account = self.get_account(verified.subject_id).await?;

        if verified.role_claim != Some(account.role) {
            if let Err(e) = self.identity.set_claims(account.id, account.role).await {
                warn!("role claim for subject {} still stale: {}", account.id, e);
            }
        }

        Ok(account)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<Account, ServiceError> {
        let doc = self
            .store
            .get(USERS, account_id)
            .await?
            .ok_or(ServiceError::AccountNotFound(account_id))?;

        Ok(serde_json::from_value(doc)?)
    }

    /// Applies the profile-editable fields and refreshes `updated_at`. Role
    /// and email have no path through here for any caller.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        payload: &UpdateProfileDto,
    ) -> Result<Account, ServiceError> {
        let changes = project_account_update(payload);

        let mut doc = serde_json::to_value(&changes)?;
        doc["updated_at"] = serde_json::to_value(Utc::now())?;

        self.store
            .update(USERS, account_id, doc)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ServiceError::AccountNotFound(account_id),
                other => ServiceError::Store(other),
            })?;

        self.get_account(account_id).await
    }

    /// Disables the identity and marks the profile inactive concurrently.
    pub async fn deactivate_account(&self, account_id: Uuid) -> Result<(), ServiceError> {
        let disable = async {
            self.identity.disable(account_id).await.map_err(|e| match e {
                IdentityError::UnknownSubject(id) => ServiceError::AccountNotFound(id),
                other => ServiceError::Identity(other),
            })
        };

        let mark_inactive = async {
            let doc = json!({
                "is_active": false,
                "updated_at": Utc::now(),
            });
            self.store
                .update(USERS, account_id, doc)
                .await
                .map_err(|e| match e {
                    StoreError::NotFound { .. } => ServiceError::AccountNotFound(account_id),
                    other => ServiceError::Store(other),
                })
        };

        tokio::try_join!(disable, mark_inactive)?;
        Ok(())
    }

    /// Active staff roster, newest first. Backs assignment pickers.
    pub async fn list_employees(&self) -> Result<Vec<Account>, ServiceError> {
        let query = Query {
            filters: vec![
                Filter::is_in(
                    "role",
                    vec![
                        json!(UserRole::Employee.to_str()),
                        json!(UserRole::Admin.to_str()),
                    ],
                ),
                Filter::eq("is_active", json!(true)),
            ],
            order_by: Some(OrderBy::desc("created_at")),
            limit: None,
            offset: None,
        };

        let docs = self.store.query(USERS, query).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(ServiceError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::identity::jwt::JwtIdentityProvider;
    use crate::store::memory::MemoryStore;
    use axum::http::StatusCode;

    fn service() -> (AccountService, Arc<MemoryStore>, Arc<JwtIdentityProvider>) {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(JwtIdentityProvider::new("account-tests-secret", 60));
        let service = AccountService::new(store.clone(), identity.clone());
        (service, store, identity)
    }

    fn register(email: &str, role: UserRole) -> RegisterAccountDto {
        RegisterAccountDto {
            email: email.to_string(),
            password: "password123".to_string(),
            display_name: "Test Person".to_string(),
            role,
            department: None,
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn test_create_account_writes_profile_and_claims() {
        let (service, store, identity) = service();

        let account = service
            .create_account(register("dana@helpdesk.test", UserRole::Employee))
            .await
            .unwrap();

        let doc = store.get(USERS, account.id).await.unwrap().unwrap();
        assert_eq!(doc["role"], "employee");
        assert_eq!(doc["is_active"], true);

        let token = identity
            .authenticate("dana@helpdesk.test", "password123")
            .await
            .unwrap();
        let verified = identity.verify(&token).await.unwrap();
        assert_eq!(verified.subject_id, account.id);
        assert_eq!(verified.role_claim, Some(UserRole::Employee));
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_conflict() {
        let (service, _store, _identity) = service();

        service
            .create_account(register("dana@helpdesk.test", UserRole::Customer))
            .await
            .unwrap();

        let err = service
            .create_account(register("DANA@helpdesk.test", UserRole::Customer))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Identity(IdentityError::EmailTaken)));
        assert_eq!(HttpError::from(err).status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_resolve_actor_reconciles_a_missed_claim() {
        let (service, store, identity) = service();

        // Identity exists but the claim push never happened.
        let subject_id = identity
            .create_account(NewIdentity {
                email: "late@helpdesk.test".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let now = Utc::now();
        let account = Account {
            id: subject_id,
            email: "late@helpdesk.test".to_string(),
            display_name: "Late Claims".to_string(),
            role: UserRole::Admin,
            department: None,
            phone_number: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store
            .set(USERS, subject_id, serde_json::to_value(&account).unwrap())
            .await
            .unwrap();

        let token = identity
            .authenticate("late@helpdesk.test", "password123")
            .await
            .unwrap();
        let verified = identity.verify(&token).await.unwrap();
        assert_eq!(verified.role_claim, None);

        let resolved = service.resolve_actor(&verified).await.unwrap();
        assert_eq!(resolved.role, UserRole::Admin);

        // The stale claim was re-pushed during resolution.
        let verified_again = identity.verify(&token).await.unwrap();
        assert_eq!(verified_again.role_claim, Some(UserRole::Admin));
    }

    #[tokio::test]
    async fn test_resolve_actor_without_profile_is_not_found() {
        let (service, _store, identity) = service();

        let subject_id = identity
            .create_account(NewIdentity {
                email: "ghost@helpdesk.test".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let token = identity
            .authenticate("ghost@helpdesk.test", "password123")
            .await
            .unwrap();
        let verified = identity.verify(&token).await.unwrap();

        let err = service.resolve_actor(&verified).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccountNotFound(id) if id == subject_id));
    }

    #[tokio::test]
    async fn test_update_profile_changes_only_projected_fields() {
        let (service, _store, _identity) = service();

        let created = service
            .create_account(register("dana@helpdesk.test", UserRole::Customer))
            .await
            .unwrap();

        let updated = service
            .update_profile(
                created.id,
                &UpdateProfileDto {
                    display_name: Some("Dana Prime".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name, "Dana Prime");
        assert_eq!(updated.role, UserRole::Customer);
        assert_eq!(updated.email, "dana@helpdesk.test");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_account_is_not_found() {
        let (service, _store, _identity) = service();

        let err = service
            .update_profile(Uuid::new_v4(), &UpdateProfileDto::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::AccountNotFound(_)));
        assert_eq!(HttpError::from(err).status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deactivate_disables_identity_and_profile_together() {
        let (service, store, identity) = service();

        let account = service
            .create_account(register("leaving@helpdesk.test", UserRole::Employee))
            .await
            .unwrap();
        let token = identity
            .authenticate("leaving@helpdesk.test", "password123")
            .await
            .unwrap();

        service.deactivate_account(account.id).await.unwrap();

        let doc = store.get(USERS, account.id).await.unwrap().unwrap();
        assert_eq!(doc["is_active"], false);
        assert!(identity.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivate_unknown_account_is_not_found() {
        let (service, _store, _identity) = service();

        let err = service.deactivate_account(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_employees_is_active_staff_only() {
        let (service, _store, _identity) = service();

        service
            .create_account(register("customer@helpdesk.test", UserRole::Customer))
            .await
            .unwrap();
        let agent = service
            .create_account(register("agent@helpdesk.test", UserRole::Employee))
            .await
            .unwrap();
        let boss = service
            .create_account(register("boss@helpdesk.test", UserRole::Admin))
            .await
            .unwrap();
        let gone = service
            .create_account(register("gone@helpdesk.test", UserRole::Employee))
            .await
            .unwrap();
        service.deactivate_account(gone.id).await.unwrap();

        let roster = service.list_employees().await.unwrap();
        let mut ids: Vec<Uuid> = roster.iter().map(|a| a.id).collect();
        ids.sort();
        let mut expected = vec![agent.id, boss.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
