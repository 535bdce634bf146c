use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    identity::IdentityError,
    service::policy::DenyReason,
    store::docstore::StoreError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Ticket {0} not found")]
    TicketNotFound(Uuid),

    #[error("Account {0} not found")]
    AccountNotFound(Uuid),

    #[error("{0}")]
    Denied(DenyReason),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::TicketNotFound(_) | ServiceError::AccountNotFound(_) => {
                HttpError::not_found(error.to_string())
            }

            ServiceError::Denied(_) => HttpError::forbidden(error.to_string()),

            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::Identity(IdentityError::EmailTaken) => {
                HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string())
            }

            // A document vanishing between the permission check and the write
            // is a legitimate not-found, not a server fault.
            ServiceError::Store(StoreError::NotFound { .. }) => {
                HttpError::not_found(error.to_string())
            }

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
