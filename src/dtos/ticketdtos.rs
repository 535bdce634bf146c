use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ticketmodel::{Ticket, TicketComment, TicketPriority, TicketStatus};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1 to 5000 characters"))]
    pub description: String,

    pub priority: Option<TicketPriority>,

    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,

    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

// Everything a client may put in a generic ticket update. What actually gets
// applied is decided per role by the field projection; `assigned_to` in
// particular is accepted on the wire and never applied, assignment being its
// own admin action.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateTicketDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1 to 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,

    #[validate(length(min = 1, max = 100, message = "Category must be 1 to 100 characters"))]
    pub category: Option<String>,

    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTicketDto {
    pub assigned_to: Uuid,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentDto {
    #[validate(length(min = 1, max = 2000, message = "Comment content must be 1 to 2000 characters"))]
    pub content: String,

    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQueryParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketData {
    pub ticket: Ticket,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponseDto {
    pub status: String,
    pub data: TicketData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketListResponseDto {
    pub status: String,
    pub tickets: Vec<Ticket>,
    pub results: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentData {
    pub comment: TicketComment,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponseDto {
    pub status: String,
    pub data: CommentData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponseDto {
    pub status: String,
    pub comments: Vec<TicketComment>,
    pub results: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketStatsDto {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketStatsResponseDto {
    pub status: String,
    pub data: TicketStatsDto,
}
