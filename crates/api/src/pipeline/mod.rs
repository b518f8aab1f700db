//! The shared mutation pipeline.
//!
//! Every create/update/delete of a ticket, department, or user runs the same
//! sequence: authorize the actor -> apply the mutation through the entity
//! store -> diff old vs new state -> record audit entries -> fan out
//! notifications. The diff is computed once per mutation and shared by the
//! audit trail and the notification text, so the two never disagree.
//!
//! Audit recording and notification dispatch are best-effort side effects of
//! the committed write: failures are logged at WARN and never propagated to
//! the caller.

mod comments;
mod departments;
mod dispatch;
mod recorder;
mod tickets;
mod users;

use std::sync::Arc;

use helpdesk_core::diff::DisplayLabels;
use helpdesk_core::notify::FanoutPolicy;
use helpdesk_core::policy::TicketRefs;
use helpdesk_core::roles::ROLE_ADMIN;
use helpdesk_core::types::DbId;
use helpdesk_db::models::ticket::Ticket;
use helpdesk_db::store::EntityStore;

/// Sequences policy check -> apply mutation -> diff -> audit -> notify for every
/// entity workflow. Generic over the store so tests run against
/// [`MemoryStore`](helpdesk_db::store::MemoryStore).
pub struct MutationPipeline<S: EntityStore> {
    store: Arc<S>,
    fanout: FanoutPolicy,
}

impl<S: EntityStore> MutationPipeline<S> {
    pub fn new(store: Arc<S>, fanout: FanoutPolicy) -> Self {
        Self { store, fanout }
    }

    /// The underlying entity store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configured fan-out policy.
    pub(crate) fn fanout(&self) -> FanoutPolicy {
        self.fanout
    }

    /* ----------------------------------------------------------------------
    Shared lookup helpers (best-effort: used for notification targeting and
    display labels after the primary write has committed)
    ---------------------------------------------------------------------- */

    /// Ids of all admin users. Lookup failures degrade to an empty list.
    pub(crate) async fn admin_ids(&self) -> Vec<DbId> {
        match self.store.list_users_by_role(ROLE_ADMIN).await {
            Ok(users) => users.into_iter().map(|u| u.id).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to look up admin users for fan-out");
                Vec::new()
            }
        }
    }

    /// Ids of all agents in a department. Lookup failures degrade to an
    /// empty list.
    pub(crate) async fn department_agent_ids(&self, department_id: DbId) -> Vec<DbId> {
        match self.store.list_agents_in_department(department_id).await {
            Ok(users) => users.into_iter().map(|u| u.id).collect(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    department_id,
                    "Failed to look up department agents for fan-out"
                );
                Vec::new()
            }
        }
    }

    /// Build display labels for the given user/department ids. Missing rows
    /// and lookup failures leave gaps, which the diff renders as
    /// `user #id` / `department #id` placeholders.
    pub(crate) async fn display_labels(
        &self,
        user_ids: &[Option<DbId>],
        department_ids: &[Option<DbId>],
    ) -> DisplayLabels {
        let mut labels = DisplayLabels::default();
        for &id in user_ids.iter().flatten() {
            if labels.users.contains_key(&id) {
                continue;
            }
            if let Ok(Some(user)) = self.store.get_user(id).await {
                labels.users.insert(id, user.username);
            }
        }
        for &id in department_ids.iter().flatten() {
            if labels.departments.contains_key(&id) {
                continue;
            }
            if let Ok(Some(department)) = self.store.get_department(id).await {
                labels.departments.insert(id, department.name);
            }
        }
        labels
    }
}

/// The policy-evaluator view of a ticket.
pub(crate) fn ticket_refs(ticket: &Ticket) -> TicketRefs {
    TicketRefs {
        user_id: ticket.user_id,
        agent_id: ticket.agent_id,
    }
}
