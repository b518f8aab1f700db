//! Notification fan-out rules.
//!
//! Recipient selection and message building are pure; row writes happen in
//! the pipeline dispatcher. Selection is an ordered union deduplicated by
//! user id, and the acting user is always excluded from the recipients of
//! their own action.

use crate::diff::FieldChange;
use crate::types::DbId;

/// Embedded free-text fields are truncated to this many characters in
/// notification messages.
pub const PREVIEW_LENGTH: usize = 50;

/// Notification type strings stored with each notification row.
pub mod kinds {
    pub const TICKET_CREATED: &str = "ticket_created";
    pub const TICKET_UPDATED: &str = "ticket_updated";
    pub const COMMENT_ADDED: &str = "comment_added";
}

/// Configurable fan-out behaviour.
#[derive(Debug, Clone, Copy)]
pub struct FanoutPolicy {
    /// Notify the previously assigned agent when a ticket is unassigned.
    /// Off by default.
    pub notify_unassigned_agent: bool,
}

impl Default for FanoutPolicy {
    fn default() -> Self {
        Self {
            notify_unassigned_agent: false,
        }
    }
}

/// The stakeholder references of a ticket after the mutation was applied.
#[derive(Debug, Clone, Copy)]
pub struct TicketStakeholders {
    /// The ticket's owner (reporter).
    pub owner_id: DbId,
    /// The currently assigned agent, if any.
    pub agent_id: Option<DbId>,
}

/* --------------------------------------------------------------------------
Recipient selection
-------------------------------------------------------------------------- */

/// Ordered recipient set that skips the actor and duplicate ids.
struct RecipientSet {
    actor_id: DbId,
    ids: Vec<DbId>,
}

impl RecipientSet {
    fn new(actor_id: DbId) -> Self {
        Self {
            actor_id,
            ids: Vec::new(),
        }
    }

    fn add(&mut self, id: DbId) {
        if id != self.actor_id && !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    fn extend(&mut self, ids: &[DbId]) {
        for &id in ids {
            self.add(id);
        }
    }
}

/// Recipients of a ticket-created event: all admins, then all agents of the
/// ticket's department.
pub fn created_recipients(
    actor_id: DbId,
    admins: &[DbId],
    department_agents: &[DbId],
) -> Vec<DbId> {
    let mut set = RecipientSet::new(actor_id);
    set.extend(admins);
    set.extend(department_agents);
    set.ids
}

/// Recipients of a ticket-updated event, derived from the shared diff.
///
/// - `status` changed: the owner and the assigned agent.
/// - `priority` changed: the owner.
/// - `agent_id` changed: the newly assigned agent; on unassignment the
///   previous agent only when [`FanoutPolicy::notify_unassigned_agent`] is on.
pub fn updated_recipients(
    policy: FanoutPolicy,
    actor_id: DbId,
    stakeholders: &TicketStakeholders,
    old_agent_id: Option<DbId>,
    changes: &[FieldChange],
) -> Vec<DbId> {
    let mut set = RecipientSet::new(actor_id);
    for change in changes {
        match change.field.as_str() {
            "status" => {
                set.add(stakeholders.owner_id);
                if let Some(agent_id) = stakeholders.agent_id {
                    set.add(agent_id);
                }
            }
            "priority" => set.add(stakeholders.owner_id),
            "agent_id" => match stakeholders.agent_id {
                Some(new_agent_id) => set.add(new_agent_id),
                None => {
                    if policy.notify_unassigned_agent {
                        if let Some(previous_agent_id) = old_agent_id {
                            set.add(previous_agent_id);
                        }
                    }
                }
            },
            _ => {}
        }
    }
    set.ids
}

/// Recipients of a comment-added event: the owner and the assigned agent;
/// when the ticket is unassigned and the actor is not the owner, all admins
/// (so orphaned conversations surface somewhere).
pub fn comment_recipients(
    actor_id: DbId,
    stakeholders: &TicketStakeholders,
    admins: &[DbId],
) -> Vec<DbId> {
    let mut set = RecipientSet::new(actor_id);
    set.add(stakeholders.owner_id);
    match stakeholders.agent_id {
        Some(agent_id) => set.add(agent_id),
        None => {
            if actor_id != stakeholders.owner_id {
                set.extend(admins);
            }
        }
    }
    set.ids
}

/* --------------------------------------------------------------------------
Message building
-------------------------------------------------------------------------- */

/// Truncate free text to [`PREVIEW_LENGTH`] characters, appending an
/// ellipsis when anything was cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LENGTH {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(PREVIEW_LENGTH).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Message for a ticket-created event.
pub fn created_message(ticket_title: &str, actor_username: &str) -> String {
    format!(
        "New ticket '{}' filed by {actor_username}",
        preview(ticket_title)
    )
}

/// Message for a ticket-updated event, composed from the shared diff.
pub fn updated_message(
    ticket_title: &str,
    actor_username: &str,
    changes: &[FieldChange],
) -> String {
    let summary: Vec<String> = changes.iter().map(FieldChange::describe).collect();
    format!(
        "Ticket '{}' updated by {actor_username}: {}",
        preview(ticket_title),
        summary.join("; ")
    )
}

/// Message for a comment-added event, with a bounded comment preview.
pub fn comment_message(ticket_title: &str, actor_username: &str, text: &str) -> String {
    format!(
        "{actor_username} commented on '{}': {}",
        preview(ticket_title),
        preview(text)
    )
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(field: &str) -> FieldChange {
        FieldChange {
            field: field.to_string(),
            old: json!("a"),
            new: json!("b"),
            note: None,
        }
    }

    #[test]
    fn created_targets_admins_then_department_agents() {
        let recipients = created_recipients(10, &[1, 2], &[20, 21]);
        assert_eq!(recipients, vec![1, 2, 20, 21]);
    }

    #[test]
    fn created_excludes_actor_and_duplicates() {
        // Actor 1 is an admin; 20 is both admin and department agent.
        let recipients = created_recipients(1, &[1, 20], &[20, 21]);
        assert_eq!(recipients, vec![20, 21]);
    }

    #[test]
    fn status_change_notifies_owner_and_agent() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(20),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            1,
            &stakeholders,
            Some(20),
            &[change("status")],
        );
        assert_eq!(recipients, vec![10, 20]);
    }

    #[test]
    fn status_change_by_owner_notifies_agent_only() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(20),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            10,
            &stakeholders,
            Some(20),
            &[change("status")],
        );
        assert_eq!(recipients, vec![20]);
    }

    #[test]
    fn priority_change_notifies_owner_only() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(20),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            1,
            &stakeholders,
            Some(20),
            &[change("priority")],
        );
        assert_eq!(recipients, vec![10]);
    }

    #[test]
    fn reassignment_notifies_new_agent_not_old() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(21),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            1,
            &stakeholders,
            Some(20),
            &[change("agent_id")],
        );
        assert_eq!(recipients, vec![21]);
    }

    #[test]
    fn unassignment_is_silent_by_default() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: None,
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            1,
            &stakeholders,
            Some(20),
            &[change("agent_id")],
        );
        assert!(recipients.is_empty());
    }

    #[test]
    fn unassignment_notifies_previous_agent_when_enabled() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: None,
        };
        let policy = FanoutPolicy {
            notify_unassigned_agent: true,
        };
        let recipients = updated_recipients(policy, 1, &stakeholders, Some(20), &[change("agent_id")]);
        assert_eq!(recipients, vec![20]);
    }

    #[test]
    fn combined_update_unions_without_duplicates() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(20),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            1,
            &stakeholders,
            Some(20),
            &[change("status"), change("priority"), change("agent_id")],
        );
        assert_eq!(recipients, vec![10, 20]);
    }

    #[test]
    fn actor_never_receives_their_own_notification() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(10),
        };
        let recipients = updated_recipients(
            FanoutPolicy::default(),
            10,
            &stakeholders,
            Some(10),
            &[change("status"), change("priority")],
        );
        assert!(recipients.is_empty());
    }

    #[test]
    fn comment_notifies_owner_and_agent() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: Some(20),
        };
        assert_eq!(comment_recipients(1, &stakeholders, &[1, 2]), vec![10, 20]);
    }

    #[test]
    fn comment_on_unassigned_ticket_by_non_owner_notifies_admins() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: None,
        };
        assert_eq!(comment_recipients(30, &stakeholders, &[1, 2]), vec![10, 1, 2]);
    }

    #[test]
    fn comment_by_owner_on_unassigned_ticket_stays_quiet() {
        let stakeholders = TicketStakeholders {
            owner_id: 10,
            agent_id: None,
        };
        assert!(comment_recipients(10, &stakeholders, &[1, 2]).is_empty());
    }

    #[test]
    fn preview_truncates_to_bounded_length() {
        let long = "x".repeat(80);
        let result = preview(&long);
        assert_eq!(result.chars().count(), PREVIEW_LENGTH + 3);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn preview_leaves_short_text_alone() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn comment_message_truncates_body() {
        let body = "y".repeat(120);
        let message = comment_message("Printer on fire", "erin", &body);
        assert!(message.contains("..."));
        assert!(message.len() < body.len());
    }

    #[test]
    fn updated_message_embeds_diff_descriptions() {
        let changes = vec![FieldChange {
            field: "status".to_string(),
            old: json!("open"),
            new: json!("closed"),
            note: None,
        }];
        let message = updated_message("Printer on fire", "root", &changes);
        assert!(message.contains("status changed from 'open' to 'closed'"));
    }
}
