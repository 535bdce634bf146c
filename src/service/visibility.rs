// src/service/visibility.rs
use crate::models::accountmodel::UserRole;
use crate::models::ticketmodel::TicketComment;

/// Strips internal comments for customers. Employees and admins see the full
/// thread. Order is preserved either way.
pub fn visible_comments(comments: &[TicketComment], role: UserRole) -> Vec<TicketComment> {
    comments
        .iter()
        .filter(|comment| !comment.is_internal || role != UserRole::Customer)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn comment(content: &str, is_internal: bool) -> TicketComment {
        TicketComment {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_email: "agent@helpdesk.test".to_string(),
            author_role: UserRole::Employee,
            content: content.to_string(),
            created_at: Utc::now(),
            is_internal,
        }
    }

    #[test]
    fn test_customer_never_sees_internal_comments() {
        let thread = vec![
            comment("public reply", false),
            comment("internal note", true),
            comment("another public reply", false),
        ];

        let filtered = visible_comments(&thread, UserRole::Customer);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|c| !c.is_internal));
        assert_eq!(filtered[0].content, "public reply");
        assert_eq!(filtered[1].content, "another public reply");
    }

    #[test]
    fn test_staff_see_the_full_thread() {
        let thread = vec![comment("public reply", false), comment("internal note", true)];

        for role in [UserRole::Employee, UserRole::Admin] {
            let filtered = visible_comments(&thread, role);
            assert_eq!(filtered.len(), 2);
        }
    }

    #[test]
    fn test_empty_thread_stays_empty() {
        assert!(visible_comments(&[], UserRole::Customer).is_empty());
    }
}
