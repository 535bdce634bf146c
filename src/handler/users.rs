// src/handler/users.rs
use std::sync::Arc;

use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    dtos::accountdtos::{AccountListResponseDto, FilterAccountDto},
    error::HttpError,
    middleware::role_check,
    models::accountmodel::UserRole,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new().route(
        "/employees",
        get(list_employees).layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        })),
    )
}

pub async fn list_employees(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let roster = app_state.account_service.list_employees().await?;

    Ok(Json(AccountListResponseDto {
        status: "success".to_string(),
        results: roster.len() as i64,
        accounts: FilterAccountDto::filter_accounts(&roster),
    }))
}
