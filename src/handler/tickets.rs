// src/handler/tickets.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::accountdtos::Response,
    dtos::ticketdtos::{
        AddCommentDto, AssignTicketDto, CommentData, CommentListResponseDto, CommentResponseDto,
        CreateTicketDto, TicketData, TicketListResponseDto, TicketQueryParams, TicketResponseDto,
        TicketStatsResponseDto, UpdateTicketDto,
    },
    error::HttpError,
    middleware::{role_check, AuthenticatedUser},
    models::accountmodel::UserRole,
    AppState,
};

pub fn tickets_handler() -> Router {
    Router::new()
        .route("/", post(create_ticket).get(list_tickets))
        .route(
            "/stats/overview",
            get(ticket_stats).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/:ticket_id",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/:ticket_id/assign", put(assign_ticket))
        .route("/:ticket_id/comments", post(add_comment).get(list_comments))
}

pub async fn create_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateTicketDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let ticket = app_state
        .ticket_service
        .create_ticket(&user.account, body)
        .await?;

    Ok(Json(TicketResponseDto {
        status: "success".to_string(),
        data: TicketData { ticket },
    }))
}

pub async fn list_tickets(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<TicketQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let page = app_state
        .ticket_service
        .list_tickets(&user.account, &params)
        .await?;

    Ok(Json(TicketListResponseDto {
        status: "success".to_string(),
        results: page.tickets.len() as i64,
        total: page.total,
        tickets: page.tickets,
    }))
}

pub async fn get_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let ticket = app_state
        .ticket_service
        .get_ticket(&user.account, ticket_id)
        .await?;

    Ok(Json(TicketResponseDto {
        status: "success".to_string(),
        data: TicketData { ticket },
    }))
}

pub async fn update_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
    Json(body): Json<UpdateTicketDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let ticket = app_state
        .ticket_service
        .update_ticket(&user.account, ticket_id, &body)
        .await?;

    Ok(Json(TicketResponseDto {
        status: "success".to_string(),
        data: TicketData { ticket },
    }))
}

pub async fn assign_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
    Json(body): Json<AssignTicketDto>,
) -> Result<impl IntoResponse, HttpError> {
    let ticket = app_state
        .ticket_service
        .assign_ticket(&user.account, ticket_id, &body)
        .await?;

    Ok(Json(TicketResponseDto {
        status: "success".to_string(),
        data: TicketData { ticket },
    }))
}

pub async fn delete_ticket(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .ticket_service
        .delete_ticket(&user.account, ticket_id)
        .await?;

    Ok(Json(Response {
        status: "success",
        message: "Ticket has been deleted".to_string(),
    }))
}

pub async fn add_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
    Json(body): Json<AddCommentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let comment = app_state
        .ticket_service
        .add_comment(&user.account, ticket_id, &body)
        .await?;

    Ok(Json(CommentResponseDto {
        status: "success".to_string(),
        data: CommentData { comment },
    }))
}

pub async fn list_comments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let comments = app_state
        .ticket_service
        .list_comments(&user.account, ticket_id)
        .await?;

    Ok(Json(CommentListResponseDto {
        status: "success".to_string(),
        results: comments.len() as i64,
        comments,
    }))
}

pub async fn ticket_stats(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state.ticket_service.ticket_stats().await?;

    Ok(Json(TicketStatsResponseDto {
        status: "success".to_string(),
        data: stats,
    }))
}
