//! Comment workflows.
//!
//! Comment visibility follows the parent ticket; deletion is open to the
//! comment's author and admins.

use helpdesk_core::audit::{self, action_types, target_types};
use helpdesk_core::error::CoreError;
use helpdesk_core::notify::{self, kinds, TicketStakeholders};
use helpdesk_core::policy::{self, Action, Actor};
use helpdesk_core::ticket;
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::models::comment::Comment;
use helpdesk_db::store::EntityStore;
use serde_json::Value;

use super::{ticket_refs, MutationPipeline};

impl<S: EntityStore> MutationPipeline<S> {
    /// Add a comment to a ticket.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        ticket_id: DbId,
        text: &str,
    ) -> Result<Comment, CoreError> {
        ticket::validate_comment(text)?;

        let parent = self
            .store()
            .get_ticket(ticket_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Ticket",
                id: ticket_id,
            })?;
        policy::authorize_ticket(actor, &ticket_refs(&parent), Action::Comment)?;

        let comment = self
            .store()
            .insert_comment(ticket_id, actor.id, text.trim())
            .await?;

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::COMMENT_ADDED.to_string(),
            description: format!("Comment added: {}", notify::preview(&comment.text)),
            target_type: target_types::TICKET.to_string(),
            target_id: ticket_id,
            old_value: None,
            new_value: audit::serialize_value(&Value::String(comment.text.clone())),
            integrity_hash: None,
        }])
        .await;

        let stakeholders = TicketStakeholders {
            owner_id: parent.user_id,
            agent_id: parent.agent_id,
        };
        // Admins only matter for orphaned conversations; skip the lookup
        // when the ticket has an assigned agent.
        let admins = if parent.agent_id.is_none() {
            self.admin_ids().await
        } else {
            Vec::new()
        };
        let recipients = notify::comment_recipients(actor.id, &stakeholders, &admins);
        let message = notify::comment_message(&parent.title, &actor.username, &comment.text);
        self.dispatch_notifications(
            &recipients,
            &message,
            kinds::COMMENT_ADDED,
            target_types::TICKET,
            ticket_id,
        )
        .await;

        Ok(comment)
    }

    /// Delete a comment (author or admin).
    pub async fn delete_comment(&self, actor: &Actor, id: DbId) -> Result<(), CoreError> {
        let comment = self
            .store()
            .get_comment(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Comment",
                id,
            })?;
        policy::authorize_comment_delete(actor, comment.user_id)?;

        if !self.store().delete_comment(id).await? {
            return Err(CoreError::NotFound {
                entity: "Comment",
                id,
            });
        }

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::COMMENT_DELETED.to_string(),
            description: format!("Comment deleted: {}", notify::preview(&comment.text)),
            target_type: target_types::TICKET.to_string(),
            target_id: comment.ticket_id,
            old_value: audit::serialize_value(&Value::String(comment.text.clone())),
            new_value: None,
            integrity_hash: None,
        }])
        .await;

        Ok(())
    }
}
