// src/service/projection.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dtos::accountdtos::UpdateProfileDto;
use crate::dtos::ticketdtos::UpdateTicketDto;
use crate::models::accountmodel::UserRole;
use crate::models::ticketmodel::{TicketPriority, TicketStatus};

/// The subset of a ticket update that survived projection for a role.
/// Serializes to exactly the fields being applied, which makes it both the
/// store partial and the activity-log delta.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TicketChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TicketChanges {
    pub fn is_empty(&self) -> bool {
        *self == TicketChanges::default()
    }
}

// Note the absence of `assigned_to` everywhere: assignment is a separate
// admin action, never part of a generic update.
pub fn project_ticket_update(role: UserRole, payload: &UpdateTicketDto) -> TicketChanges {
    match role {
        UserRole::Customer => TicketChanges {
            description: payload.description.clone(),
            ..Default::default()
        },
        UserRole::Employee => TicketChanges {
            status: payload.status,
            description: payload.description.clone(),
            ..Default::default()
        },
        UserRole::Admin => TicketChanges {
            title: payload.title.clone(),
            description: payload.description.clone(),
            status: payload.status,
            priority: payload.priority,
            category: payload.category.clone(),
            due_date: payload.due_date,
            tags: payload.tags.clone(),
        },
    }
}

/// Applied subset of an account update. The same set for self-service and
/// admin edits; role and email have no representation here at all.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AccountChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

pub fn project_account_update(payload: &UpdateProfileDto) -> AccountChanges {
    AccountChanges {
        display_name: payload.display_name.clone(),
        phone_number: payload.phone_number.clone(),
        department: payload.department.clone(),
    }
}
