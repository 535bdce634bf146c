// src/handler/auth.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::accountdtos::{
        AccountData, AccountResponseDto, FilterAccountDto, RegisterAccountDto, Response,
        UpdateProfileDto,
    },
    error::HttpError,
    middleware::{role_check, AuthenticatedUser},
    models::accountmodel::UserRole,
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route(
            "/users",
            post(create_account).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/users/:user_id",
            put(admin_update_account)
                .delete(deactivate_account)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                })),
        )
}

pub async fn create_account(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterAccountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let account = app_state.account_service.create_account(body).await?;

    Ok(Json(AccountResponseDto {
        status: "success".to_string(),
        data: AccountData {
            account: FilterAccountDto::filter_account(&account),
        },
    }))
}

pub async fn get_profile(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(AccountResponseDto {
        status: "success".to_string(),
        data: AccountData {
            account: FilterAccountDto::filter_account(&user.account),
        },
    }))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let account = app_state
        .account_service
        .update_profile(user.account.id, &body)
        .await?;

    Ok(Json(AccountResponseDto {
        status: "success".to_string(),
        data: AccountData {
            account: FilterAccountDto::filter_account(&account),
        },
    }))
}

pub async fn admin_update_account(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let account = app_state
        .account_service
        .update_profile(user_id, &body)
        .await?;

    Ok(Json(AccountResponseDto {
        status: "success".to_string(),
        data: AccountData {
            account: FilterAccountDto::filter_account(&account),
        },
    }))
}

pub async fn deactivate_account(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.account_service.deactivate_account(user_id).await?;

    Ok(Json(Response {
        status: "success",
        message: "Account has been deactivated".to_string(),
    }))
}
