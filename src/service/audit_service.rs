// src/service/audit_service.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::models::accountmodel::Account;
use crate::models::ticketmodel::{Ticket, TicketActivity, TicketComment};
use crate::service::projection::TicketChanges;
use crate::store::docstore::DocumentStore;

pub const TICKET_ACTIVITIES: &str = "ticket_activities";

/// Writes one activity record per accepted ticket mutation. Recording is
/// best-effort: a failed write is logged and swallowed so it can never fail
/// the mutation it describes.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn DocumentStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn log_ticket_created(&self, actor_id: Uuid, ticket: &Ticket) {
        self.record(
            ticket.id,
            actor_id,
            "created",
            json!({
                "title": ticket.title,
                "category": ticket.category,
                "priority": ticket.priority,
            }),
        )
        .await
    }

    pub async fn log_ticket_updated(&self, actor_id: Uuid, ticket_id: Uuid, changes: &TicketChanges) {
        let delta = serde_json::to_value(changes).unwrap_or_else(|_| json!({}));
        self.record(ticket_id, actor_id, "updated", delta).await
    }

    pub async fn log_ticket_assigned(&self, actor_id: Uuid, ticket_id: Uuid, assignee: &Account) {
        self.record(
            ticket_id,
            actor_id,
            "assigned",
            json!({
                "assigned_to": assignee.id,
                "assigned_to_email": assignee.email,
            }),
        )
        .await
    }

    pub async fn log_comment_added(&self, actor_id: Uuid, comment: &TicketComment) {
        self.record(
            comment.ticket_id,
            actor_id,
            "commented",
            json!({
                "comment_id": comment.id,
                "is_internal": comment.is_internal,
            }),
        )
        .await
    }

    pub async fn log_ticket_deleted(&self, actor_id: Uuid, ticket: &Ticket) {
        self.record(
            ticket.id,
            actor_id,
            "deleted",
            json!({
                "title": ticket.title,
                "status": ticket.status,
            }),
        )
        .await
    }

    async fn record(&self, ticket_id: Uuid, user_id: Uuid, action: &str, details: serde_json::Value) {
        let activity = TicketActivity {
            ticket_id,
            user_id,
            action: action.to_string(),
            details,
            created_at: Utc::now(),
        };

        let doc = match serde_json::to_value(&activity) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("skipping '{}' activity for ticket {}: {}", action, ticket_id, e);
                return;
            }
        };

        if let Err(e) = self.store.add(TICKET_ACTIVITIES, doc).await {
            warn!(
                "failed to record '{}' activity for ticket {}: {}",
                action, ticket_id, e
            );
        }
    }
}
