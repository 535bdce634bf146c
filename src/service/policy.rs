// src/service/policy.rs
use std::fmt;

use uuid::Uuid;

use crate::models::accountmodel::{Account, UserRole};
use crate::models::ticketmodel::{Ticket, TicketStatus};

/// Every gated ticket action. Resource-targeted variants carry the ticket so
/// a decision is a total match over (role, action) with the ownership facts
/// in hand. Callers resolve not-found before building an action: the engine
/// assumes the resource exists.
#[derive(Debug, Clone, Copy)]
pub enum TicketAction<'t> {
    Create,
    List,
    Read(&'t Ticket),
    Update(&'t Ticket),
    Assign(&'t Ticket),
    Delete(&'t Ticket),
    AddComment(&'t Ticket),
    AddInternalComment(&'t Ticket),
    ReadComments(&'t Ticket),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DenyReason {
    RoleNotPermitted,
    NotTicketOwner,
    NotTicketAssignee,
    TicketNotOpen,
    InternalCommentsRestricted,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::RoleNotPermitted => write!(f, "Access denied"),
            DenyReason::NotTicketOwner => write!(f, "Access denied: not your ticket"),
            DenyReason::NotTicketAssignee => {
                write!(f, "Access denied: ticket is not assigned to you")
            }
            DenyReason::TicketNotOpen => write!(f, "Cannot update closed ticket"),
            DenyReason::InternalCommentsRestricted => {
                write!(f, "Customers cannot create internal comments")
            }
        }
    }
}

/// Which slice of the ticket collection a list request may see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TicketScope {
    OwnedBy(Uuid),
    AssignedTo(Uuid),
    All,
}

pub fn decide(actor: &Account, action: TicketAction) -> Decision {
    match action {
        TicketAction::Create => match actor.role {
            UserRole::Customer | UserRole::Admin => Decision::Allow,
            UserRole::Employee => Decision::Deny(DenyReason::RoleNotPermitted),
        },

        // Every role may list; what differs is the scope, see `list_scope`.
        TicketAction::List => Decision::Allow,

        TicketAction::Read(ticket) => match actor.role {
            UserRole::Customer => owner_only(actor, ticket),
            UserRole::Employee => assignee_only(actor, ticket),
            UserRole::Admin => Decision::Allow,
        },

        TicketAction::Update(ticket) => match actor.role {
            // Owning customers may only touch a ticket that is still open.
            UserRole::Customer => match owner_only(actor, ticket) {
                Decision::Allow if ticket.status != TicketStatus::Open => {
                    Decision::Deny(DenyReason::TicketNotOpen)
                }
                decision => decision,
            },
            UserRole::Employee => assignee_only(actor, ticket),
            UserRole::Admin => Decision::Allow,
        },

        TicketAction::Assign(_) | TicketAction::Delete(_) => match actor.role {
            UserRole::Customer | UserRole::Employee => {
                Decision::Deny(DenyReason::RoleNotPermitted)
            }
            UserRole::Admin => Decision::Allow,
        },

        TicketAction::AddComment(ticket) | TicketAction::ReadComments(ticket) => {
            match actor.role {
                UserRole::Customer => owner_only(actor, ticket),
                UserRole::Employee => assignee_only(actor, ticket),
                UserRole::Admin => Decision::Allow,
            }
        }

        TicketAction::AddInternalComment(ticket) => match actor.role {
            UserRole::Customer => Decision::Deny(DenyReason::InternalCommentsRestricted),
            UserRole::Employee => assignee_only(actor, ticket),
            UserRole::Admin => Decision::Allow,
        },
    }
}

pub fn ensure(actor: &Account, action: TicketAction) -> Result<(), DenyReason> {
    match decide(actor, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason),
    }
}

pub fn list_scope(actor: &Account) -> TicketScope {
    match actor.role {
        UserRole::Customer => TicketScope::OwnedBy(actor.id),
        UserRole::Employee => TicketScope::AssignedTo(actor.id),
        UserRole::Admin => TicketScope::All,
    }
}

fn owner_only(actor: &Account, ticket: &Ticket) -> Decision {
    if ticket.customer_id == actor.id {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotTicketOwner)
    }
}

fn assignee_only(actor: &Account, ticket: &Ticket) -> Decision {
    if ticket.assigned_to == Some(actor.id) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotTicketAssignee)
    }
}
