//! Ticket mutation workflows.
//!
//! The update sequence is atomic from the caller's point of view: staged
//! fields are applied in a single store write guarded by an optimistic
//! `updated_at` check, and a lost race re-runs the load -> authorize -> diff ->
//! write loop against the fresh snapshot. Audit and notification writes run
//! after the primary write commits.

use chrono::Utc;
use helpdesk_core::audit::{self, action_types, target_types};
use helpdesk_core::diff;
use helpdesk_core::error::CoreError;
use helpdesk_core::notify::{self, kinds, TicketStakeholders};
use helpdesk_core::policy::{self, Action, Actor};
use helpdesk_core::roles::{ROLE_AGENT, ROLE_ADMIN, ROLE_CLIENT};
use helpdesk_core::ticket::{self, ClosedAtChange, PRIORITY_MEDIUM, STATUS_OPEN};
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::models::ticket::{CreateTicket, NewTicket, Ticket, TicketWrite, UpdateTicket};
use helpdesk_db::store::EntityStore;
use serde_json::Value;

use super::{ticket_refs, MutationPipeline};

/// How many times a lost optimistic-update race is retried before the
/// caller gets a `Conflict`.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

impl<S: EntityStore> MutationPipeline<S> {
    /// Create a ticket.
    ///
    /// Clients file their own tickets; admins may file on behalf of any
    /// user. New tickets start `open`, unassigned, with `closed_at` null.
    pub async fn create_ticket(
        &self,
        actor: &Actor,
        input: &CreateTicket,
    ) -> Result<Ticket, CoreError> {
        ticket::validate_title(&input.title)?;
        ticket::validate_description(&input.description)?;
        let priority = match input.priority {
            Some(ref priority) => {
                ticket::validate_priority(priority)?;
                priority.clone()
            }
            None => PRIORITY_MEDIUM.to_string(),
        };

        let owner_id = match input.user_id {
            Some(on_behalf_of) if on_behalf_of != actor.id => {
                if !actor.is_admin() {
                    return Err(CoreError::Forbidden(
                        "Only admins may file tickets on behalf of another user".to_string(),
                    ));
                }
                self.store()
                    .get_user(on_behalf_of)
                    .await?
                    .ok_or_else(|| CoreError::Validation(format!("Unknown user {on_behalf_of}")))?;
                on_behalf_of
            }
            _ => {
                if actor.role != ROLE_CLIENT && actor.role != ROLE_ADMIN {
                    return Err(CoreError::Forbidden(
                        "Only clients and admins may file tickets".to_string(),
                    ));
                }
                actor.id
            }
        };

        let department = self
            .store()
            .get_department(input.department_id)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!("Unknown department {}", input.department_id))
            })?;

        let ticket = self
            .store()
            .insert_ticket(&NewTicket {
                title: input.title.clone(),
                description: input.description.clone(),
                status: STATUS_OPEN.to_string(),
                priority,
                department_id: input.department_id,
                user_id: owner_id,
                agent_id: None,
            })
            .await?;

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::TICKET_CREATED.to_string(),
            description: format!(
                "Ticket '{}' created in department '{}'",
                ticket.title, department.name
            ),
            target_type: target_types::TICKET.to_string(),
            target_id: ticket.id,
            old_value: None,
            new_value: audit::serialize_value(&Value::Object(ticket.snapshot())),
            integrity_hash: None,
        }])
        .await;

        let admins = self.admin_ids().await;
        let department_agents = self.department_agent_ids(ticket.department_id).await;
        let recipients = notify::created_recipients(actor.id, &admins, &department_agents);
        let message = notify::created_message(&ticket.title, &actor.username);
        self.dispatch_notifications(
            &recipients,
            &message,
            kinds::TICKET_CREATED,
            target_types::TICKET,
            ticket.id,
        )
        .await;

        Ok(ticket)
    }

    /// Update a ticket.
    ///
    /// Fields absent from the request are left unchanged; a request whose
    /// fields all match the current state is an idempotent no-op (no write,
    /// no audit entries, no notifications). A status transition across the
    /// `closed` boundary derives the `closed_at` adjustment automatically.
    pub async fn update_ticket(
        &self,
        actor: &Actor,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Ticket, CoreError> {
        if let Some(ref title) = input.title {
            ticket::validate_title(title)?;
        }
        if let Some(ref description) = input.description {
            ticket::validate_description(description)?;
        }
        if let Some(ref status) = input.status {
            ticket::validate_status(status)?;
        }
        if let Some(ref priority) = input.priority {
            ticket::validate_priority(priority)?;
        }
        if let Some(department_id) = input.department_id {
            self.store()
                .get_department(department_id)
                .await?
                .ok_or_else(|| {
                    CoreError::Validation(format!("Unknown department {department_id}"))
                })?;
        }
        if let Some(Some(agent_id)) = input.agent_id {
            let agent = self
                .store()
                .get_user(agent_id)
                .await?
                .ok_or_else(|| CoreError::Validation(format!("Unknown user {agent_id}")))?;
            if agent.role != ROLE_AGENT && agent.role != ROLE_ADMIN {
                return Err(CoreError::Validation(format!(
                    "User '{}' cannot be assigned: not an agent",
                    agent.username
                )));
            }
        }

        let requested = input.snapshot();

        for _attempt in 0..MAX_UPDATE_ATTEMPTS {
            let current = self
                .store()
                .get_ticket(id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Ticket",
                    id,
                })?;
            policy::authorize_ticket(actor, &ticket_refs(&current), Action::Update)?;

            let raw_changes =
                diff::diff_snapshots(&current.snapshot(), &requested, diff::TICKET_FIELDS);
            if raw_changes.is_empty() {
                return Ok(current);
            }

            let now = Utc::now();
            let mut write = TicketWrite::default();
            for change in &raw_changes {
                match change.field.as_str() {
                    "title" => write.title = input.title.clone(),
                    "description" => write.description = input.description.clone(),
                    "status" => {
                        write.status = input.status.clone();
                        let new_status = input.status.as_deref().unwrap_or_default();
                        match ticket::closed_at_change(&current.status, new_status) {
                            ClosedAtChange::Set => write.closed_at = Some(Some(now)),
                            ClosedAtChange::Clear => write.closed_at = Some(None),
                            ClosedAtChange::Unchanged => {}
                        }
                    }
                    "priority" => write.priority = input.priority.clone(),
                    "department_id" => write.department_id = input.department_id,
                    "agent_id" => write.agent_id = input.agent_id,
                    _ => {}
                }
            }

            // Optimistic write: misses when another writer got there first,
            // in which case we re-read and re-diff against the fresh state.
            let Some(updated) = self
                .store()
                .update_ticket(id, &write, current.updated_at)
                .await?
            else {
                continue;
            };

            // Single decorated diff, shared by audit entries and
            // notification text.
            let labels = self
                .display_labels(
                    &[current.agent_id, updated.agent_id],
                    &[Some(current.department_id), Some(updated.department_id)],
                )
                .await;
            let changes =
                diff::decorate_ticket_diff(raw_changes, &labels, current.closed_at, now);

            let entries = changes
                .iter()
                .map(|change| NewActivityEntry {
                    actor_id: actor.id,
                    actor_username: actor.username.clone(),
                    actor_role: actor.role.clone(),
                    action_type: audit::ticket_field_action(change).to_string(),
                    description: change.describe(),
                    target_type: target_types::TICKET.to_string(),
                    target_id: id,
                    old_value: audit::serialize_value(&change.old),
                    new_value: audit::serialize_value(&change.new),
                    integrity_hash: None,
                })
                .collect();
            self.record_activity(entries).await;

            let stakeholders = TicketStakeholders {
                owner_id: updated.user_id,
                agent_id: updated.agent_id,
            };
            let recipients = notify::updated_recipients(
                self.fanout(),
                actor.id,
                &stakeholders,
                current.agent_id,
                &changes,
            );
            let message = notify::updated_message(&updated.title, &actor.username, &changes);
            self.dispatch_notifications(
                &recipients,
                &message,
                kinds::TICKET_UPDATED,
                target_types::TICKET,
                id,
            )
            .await;

            return Ok(updated);
        }

        Err(CoreError::Conflict(
            "Ticket was modified concurrently; retry the update".to_string(),
        ))
    }

    /// Delete a ticket, cascading its notifications, activity entries, and
    /// comments (in that order) before the ticket row itself.
    pub async fn delete_ticket(&self, actor: &Actor, id: DbId) -> Result<(), CoreError> {
        let ticket = self
            .store()
            .get_ticket(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Ticket",
                id,
            })?;
        policy::authorize_ticket(actor, &ticket_refs(&ticket), Action::Delete)?;

        self.store()
            .delete_notifications_for_related(target_types::TICKET, id)
            .await?;
        self.store()
            .delete_activity_for_target(target_types::TICKET, id)
            .await?;
        self.store().delete_comments_for_ticket(id).await?;
        if !self.store().delete_ticket(id).await? {
            return Err(CoreError::NotFound {
                entity: "Ticket",
                id,
            });
        }

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::TICKET_DELETED.to_string(),
            description: format!("Ticket '{}' deleted", ticket.title),
            target_type: target_types::TICKET.to_string(),
            target_id: id,
            old_value: audit::serialize_value(&Value::Object(ticket.snapshot())),
            new_value: None,
            integrity_hash: None,
        }])
        .await;

        Ok(())
    }
}
