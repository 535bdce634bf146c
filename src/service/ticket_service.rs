// src/service/ticket_service.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::dtos::ticketdtos::{
    AddCommentDto, AssignTicketDto, CreateTicketDto, TicketQueryParams, TicketStatsDto,
    UpdateTicketDto,
};
use crate::models::accountmodel::{Account, UserRole};
use crate::models::ticketmodel::{Ticket, TicketComment, TicketPriority, TicketStatus};
use crate::service::account_service::AccountService;
use crate::service::audit_service::AuditService;
use crate::service::error::ServiceError;
use crate::service::policy::{self, TicketAction, TicketScope};
use crate::service::projection::project_ticket_update;
use crate::service::visibility::visible_comments;
use crate::store::docstore::{DocumentStore, Filter, OrderBy, Query, StoreError};

pub const TICKETS: &str = "tickets";

/// One page of a ticket listing. `total` is the pre-pagination count and only
/// present for the admin scope; customer and employee listings are returned
/// whole.
#[derive(Debug)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub total: Option<i64>,
}

#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn DocumentStore>,
    account_service: Arc<AccountService>,
    audit_service: Arc<AuditService>,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        account_service: Arc<AccountService>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            store,
            account_service,
            audit_service,
        }
    }

    pub async fn create_ticket(
        &self,
        actor: &Account,
        payload: CreateTicketDto,
    ) -> Result<Ticket, ServiceError> {
        policy::ensure(actor, TicketAction::Create).map_err(ServiceError::Denied)?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            title: payload.title,
            description: payload.description,
            status: TicketStatus::Open,
            priority: payload.priority.unwrap_or(TicketPriority::Medium),
            category: payload.category,
            customer_id: actor.id,
            customer_email: actor.email.clone(),
            assigned_to: None,
            assigned_to_email: None,
            created_by: actor.id,
            created_at: now,
            updated_at: now,
            due_date: payload.due_date,
            resolved_at: None,
            tags: payload.tags,
            attachments: None,
            comments: vec![],
        };

        self.store
            .set(TICKETS, ticket.id, serde_json::to_value(&ticket)?)
            .await?;

        self.audit_service.log_ticket_created(actor.id, &ticket).await;

        Ok(ticket)
    }

    pub async fn get_ticket(&self, actor: &Account, ticket_id: Uuid) -> Result<Ticket, ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        policy::ensure(actor, TicketAction::Read(&ticket)).map_err(ServiceError::Denied)?;

        Ok(trim_comments(ticket, actor.role))
    }

    /// Role-scoped listing. Customers get their own tickets, employees their
    /// assignments, both whole and newest first. Admins get the full
    /// collection with optional filters and pagination.
    pub async fn list_tickets(
        &self,
        actor: &Account,
        params: &TicketQueryParams,
    ) -> Result<TicketPage, ServiceError> {
        policy::ensure(actor, TicketAction::List).map_err(ServiceError::Denied)?;

        match policy::list_scope(actor) {
            TicketScope::OwnedBy(customer_id) => {
                let query = Query {
                    filters: vec![Filter::eq("customer_id", json!(customer_id))],
                    order_by: Some(OrderBy::desc("created_at")),
                    limit: None,
                    offset: None,
                };
                let tickets = self.run_ticket_query(query, actor.role).await?;
                Ok(TicketPage { tickets, total: None })
            }
            TicketScope::AssignedTo(assignee_id) => {
                let query = Query {
                    filters: vec![Filter::eq("assigned_to", json!(assignee_id))],
                    order_by: Some(OrderBy::desc("created_at")),
                    limit: None,
                    offset: None,
                };
                let tickets = self.run_ticket_query(query, actor.role).await?;
                Ok(TicketPage { tickets, total: None })
            }
            TicketScope::All => {
                let mut filters = Vec::new();
                if let Some(status) = params.status {
                    filters.push(Filter::eq("status", json!(status)));
                }
                if let Some(priority) = params.priority {
                    filters.push(Filter::eq("priority", json!(priority)));
                }
                if let Some(assignee_id) = params.assigned_to {
                    filters.push(Filter::eq("assigned_to", json!(assignee_id)));
                }

                let page = params.page.unwrap_or(1).max(1);
                let limit = params.limit.unwrap_or(10);

                let count_query = Query {
                    filters: filters.clone(),
                    order_by: None,
                    limit: None,
                    offset: None,
                };
                let total = self.store.query(TICKETS, count_query).await?.len() as i64;

                let page_query = Query {
                    filters,
                    order_by: Some(OrderBy::desc("created_at")),
                    limit: Some(limit),
                    offset: Some((page - 1) * limit),
                };
                let tickets = self.run_ticket_query(page_query, actor.role).await?;
                Ok(TicketPage {
                    tickets,
                    total: Some(total),
                })
            }
        }
    }

    /// Applies the role-projected subset of `payload`. The first transition
    /// into resolved stamps `resolved_at`; later transitions never move or
    /// clear it.
    pub async fn update_ticket(
        &self,
        actor: &Account,
        ticket_id: Uuid,
        payload: &UpdateTicketDto,
    ) -> Result<Ticket, ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        policy::ensure(actor, TicketAction::Update(&ticket)).map_err(ServiceError::Denied)?;

        let changes = project_ticket_update(actor.role, payload);
        if changes.is_empty() {
            debug!("update for ticket {} carried no applicable fields", ticket_id);
        }

        let now = Utc::now();
        let mut doc = serde_json::to_value(&changes)?;
        doc["updated_at"] = serde_json::to_value(now)?;
        if changes.status == Some(TicketStatus::Resolved) && ticket.resolved_at.is_none() {
            doc["resolved_at"] = serde_json::to_value(now)?;
        }

        self.store
            .update(TICKETS, ticket_id, doc)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ServiceError::TicketNotFound(ticket_id),
                other => ServiceError::Store(other),
            })?;

        self.audit_service
            .log_ticket_updated(actor.id, ticket_id, &changes)
            .await;

        let updated = self.fetch_ticket(ticket_id).await?;
        Ok(trim_comments(updated, actor.role))
    }

    /// Admin-only hand-off to an active staff member. Assignment always moves
    /// the ticket to in_progress.
    pub async fn assign_ticket(
        &self,
        actor: &Account,
        ticket_id: Uuid,
        payload: &AssignTicketDto,
    ) -> Result<Ticket, ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        policy::ensure(actor, TicketAction::Assign(&ticket)).map_err(ServiceError::Denied)?;

        let assignee = self
            .account_service
            .get_account(payload.assigned_to)
            .await
            .map_err(|e| match e {
                ServiceError::AccountNotFound(id) => {
                    ServiceError::Validation(format!("assignee {} does not exist", id))
                }
                other => other,
            })?;

        if !assignee.is_active {
            return Err(ServiceError::Validation(format!(
                "assignee {} is deactivated",
                assignee.id
            )));
        }
        if assignee.role == UserRole::Customer {
            return Err(ServiceError::Validation(
                "tickets can only be assigned to staff".to_string(),
            ));
        }

        let doc = json!({
            "assigned_to": assignee.id,
            "assigned_to_email": assignee.email,
            "status": TicketStatus::InProgress,
            "updated_at": Utc::now(),
        });
        self.store
            .update(TICKETS, ticket_id, doc)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ServiceError::TicketNotFound(ticket_id),
                other => ServiceError::Store(other),
            })?;

        self.audit_service
            .log_ticket_assigned(actor.id, ticket_id, &assignee)
            .await;

        let updated = self.fetch_ticket(ticket_id).await?;
        Ok(trim_comments(updated, actor.role))
    }

    pub async fn add_comment(
        &self,
        actor: &Account,
        ticket_id: Uuid,
        payload: &AddCommentDto,
    ) -> Result<TicketComment, ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        let action = if payload.is_internal {
            TicketAction::AddInternalComment(&ticket)
        } else {
            TicketAction::AddComment(&ticket)
        };
        policy::ensure(actor, action).map_err(ServiceError::Denied)?;

        let now = Utc::now();
        let comment = TicketComment {
            id: Uuid::new_v4(),
            ticket_id,
            author_id: actor.id,
            author_email: actor.email.clone(),
            author_role: actor.role,
            content: payload.content.clone(),
            created_at: now,
            is_internal: payload.is_internal,
        };

        self.store
            .append_to_array(TICKETS, ticket_id, "comments", serde_json::to_value(&comment)?)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ServiceError::TicketNotFound(ticket_id),
                other => ServiceError::Store(other),
            })?;
        self.store
            .update(TICKETS, ticket_id, json!({"updated_at": now}))
            .await?;

        self.audit_service.log_comment_added(actor.id, &comment).await;

        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        actor: &Account,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketComment>, ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        policy::ensure(actor, TicketAction::ReadComments(&ticket)).map_err(ServiceError::Denied)?;

        Ok(visible_comments(&ticket.comments, actor.role))
    }

    pub async fn delete_ticket(&self, actor: &Account, ticket_id: Uuid) -> Result<(), ServiceError> {
        let ticket = self.fetch_ticket(ticket_id).await?;
        policy::ensure(actor, TicketAction::Delete(&ticket)).map_err(ServiceError::Denied)?;

        self.store.delete(TICKETS, ticket_id).await?;

        self.audit_service.log_ticket_deleted(actor.id, &ticket).await;

        Ok(())
    }

    /// Status breakdown over the whole collection, the five counts gathered
    /// concurrently.
    pub async fn ticket_stats(&self) -> Result<TicketStatsDto, ServiceError> {
        let (total, open, in_progress, resolved, closed) = tokio::try_join!(
            self.count_status(None),
            self.count_status(Some(TicketStatus::Open)),
            self.count_status(Some(TicketStatus::InProgress)),
            self.count_status(Some(TicketStatus::Resolved)),
            self.count_status(Some(TicketStatus::Closed)),
        )?;

        Ok(TicketStatsDto {
            total,
            open,
            in_progress,
            resolved,
            closed,
        })
    }

    async fn count_status(&self, status: Option<TicketStatus>) -> Result<i64, ServiceError> {
        let mut query = Query::default();
        if let Some(status) = status {
            query.filters.push(Filter::eq("status", json!(status)));
        }
        let rows = self.store.query(TICKETS, query).await?;
        Ok(rows.len() as i64)
    }

    async fn fetch_ticket(&self, ticket_id: Uuid) -> Result<Ticket, ServiceError> {
        let doc = self
            .store
            .get(TICKETS, ticket_id)
            .await?
            .ok_or(ServiceError::TicketNotFound(ticket_id))?;

        Ok(serde_json::from_value(doc)?)
    }

    async fn run_ticket_query(&self, query: Query, role: UserRole) -> Result<Vec<Ticket>, ServiceError> {
        let docs = self.store.query(TICKETS, query).await?;
        docs.into_iter()
            .map(|doc| {
                serde_json::from_value::<Ticket>(doc)
                    .map(|ticket| trim_comments(ticket, role))
                    .map_err(ServiceError::from)
            })
            .collect()
    }
}

fn trim_comments(mut ticket: Ticket, role: UserRole) -> Ticket {
    ticket.comments = visible_comments(&ticket.comments, role);
    ticket
}
