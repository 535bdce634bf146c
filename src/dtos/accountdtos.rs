use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::accountmodel::{Account, UserRole};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAccountDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 8, max = 64, message = "Password must be 8 to 64 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be 1 to 100 characters"))]
    pub display_name: String,

    pub role: UserRole,

    #[validate(length(min = 1, max = 100, message = "Department must be 1 to 100 characters"))]
    pub department: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub phone_number: Option<String>,
}

// Shared by self-service profile edits and admin edits of another account.
// Role and email are deliberately absent; role changes only happen through
// the admin claims-grant path at account creation.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1 to 100 characters"))]
    pub display_name: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Department must be 1 to 100 characters"))]
    pub department: Option<String>,
}

fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let phone_regex =
        regex::Regex::new(r"^(\+?[0-9]{1,3}[- ]?)?[0-9]{3}[- ]?[0-9]{3}[- ]?[0-9]{4}$")
            .map_err(|_| ValidationError::new("invalid_phone_regex"))?;

    if !phone_regex.is_match(phone) {
        let mut error = ValidationError::new("invalid_phone");
        error.message = Some(Cow::from(
            "Phone number must be in a valid format (e.g., +1234567890 or 123-456-7890)",
        ));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterAccountDto {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterAccountDto {
    pub fn filter_account(account: &Account) -> Self {
        FilterAccountDto {
            id: account.id.to_string(),
            email: account.email.to_owned(),
            display_name: account.display_name.to_owned(),
            role: account.role.to_str().to_string(),
            department: account.department.clone(),
            phone_number: account.phone_number.clone(),
            is_active: account.is_active,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }

    pub fn filter_accounts(accounts: &[Account]) -> Vec<FilterAccountDto> {
        accounts.iter().map(FilterAccountDto::filter_account).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountData {
    pub account: FilterAccountDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponseDto {
    pub status: String,
    pub data: AccountData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountListResponseDto {
    pub status: String,
    pub accounts: Vec<FilterAccountDto>,
    pub results: i64,
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}
