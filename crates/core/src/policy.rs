//! Authorization policy evaluation.
//!
//! One rule set shared by every entry point. Evaluation is pure: the caller
//! loads the target snapshot, this module only decides. The boolean
//! `*_allowed` functions are the primitive predicates; the `authorize_*`
//! wrappers turn a denial into [`CoreError::Forbidden`] for use with `?`.

use crate::error::CoreError;
use crate::roles::{ROLE_AGENT, ROLE_ADMIN, ROLE_CLIENT};
use crate::types::DbId;

/// The acting user, as supplied by the authentication context.
///
/// The username is carried along because the audit trail snapshots it.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: DbId,
    pub username: String,
    pub role: String,
}

impl Actor {
    pub fn new(id: DbId, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// A requested action against a target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
    Comment,
}

impl Action {
    /// Lower-case name for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Comment => "comment",
        }
    }
}

/// The ownership/assignment relationships of a ticket, extracted from its
/// snapshot. All the evaluator needs to know about the target.
#[derive(Debug, Clone, Copy)]
pub struct TicketRefs {
    /// The ticket's owner (reporter).
    pub user_id: DbId,
    /// The assigned agent, if any.
    pub agent_id: Option<DbId>,
}

/* --------------------------------------------------------------------------
Ticket rules
-------------------------------------------------------------------------- */

/// Whether `actor` may perform `action` on the ticket.
///
/// - `admin`: everything.
/// - `client`: read/update/comment on their own tickets only.
/// - `agent`: read/update/comment when assigned, or when the ticket is
///   unassigned (any agent may pick up unassigned tickets).
/// - delete: admin or the original reporter.
pub fn ticket_action_allowed(actor: &Actor, ticket: &TicketRefs, action: Action) -> bool {
    if actor.is_admin() {
        return true;
    }
    match action {
        Action::Read | Action::Update | Action::Comment => match actor.role.as_str() {
            ROLE_CLIENT => actor.id == ticket.user_id,
            ROLE_AGENT => ticket.agent_id.is_none() || ticket.agent_id == Some(actor.id),
            _ => false,
        },
        Action::Delete => actor.id == ticket.user_id,
    }
}

/// [`ticket_action_allowed`] as a `Result` for use with `?`.
pub fn authorize_ticket(
    actor: &Actor,
    ticket: &TicketRefs,
    action: Action,
) -> Result<(), CoreError> {
    if ticket_action_allowed(actor, ticket, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not allowed to {} this ticket",
            action.as_str()
        )))
    }
}

/* --------------------------------------------------------------------------
Comment rules
-------------------------------------------------------------------------- */

/// Whether `actor` may delete a comment. The comment's own author may always
/// delete it, regardless of their current relationship to the ticket.
pub fn comment_delete_allowed(actor: &Actor, comment_author_id: DbId) -> bool {
    actor.is_admin() || actor.id == comment_author_id
}

/// [`comment_delete_allowed`] as a `Result` for use with `?`.
pub fn authorize_comment_delete(actor: &Actor, comment_author_id: DbId) -> Result<(), CoreError> {
    if comment_delete_allowed(actor, comment_author_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Not allowed to delete this comment".to_string(),
        ))
    }
}

/* --------------------------------------------------------------------------
Department rules
-------------------------------------------------------------------------- */

/// Whether `actor` may perform `action` on a department. Reads are open to
/// every authenticated role; mutations are admin-only.
pub fn department_action_allowed(actor: &Actor, action: Action) -> bool {
    match action {
        Action::Read => true,
        _ => actor.is_admin(),
    }
}

/// [`department_action_allowed`] as a `Result` for use with `?`.
pub fn authorize_department(actor: &Actor, action: Action) -> Result<(), CoreError> {
    if department_action_allowed(actor, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not allowed to {} departments",
            action.as_str()
        )))
    }
}

/* --------------------------------------------------------------------------
User rules
-------------------------------------------------------------------------- */

/// Whether `actor` may perform `action` on the user with `target_user_id`.
///
/// Admins may do everything. Users may read and update themselves (field
/// restrictions on self-update are enforced by the mutation workflow: role,
/// username and department changes stay admin-only). Deletion and creation
/// are admin-only.
pub fn user_action_allowed(actor: &Actor, target_user_id: DbId, action: Action) -> bool {
    if actor.is_admin() {
        return true;
    }
    match action {
        Action::Read | Action::Update => actor.id == target_user_id,
        _ => false,
    }
}

/// [`user_action_allowed`] as a `Result` for use with `?`.
pub fn authorize_user(
    actor: &Actor,
    target_user_id: DbId,
    action: Action,
) -> Result<(), CoreError> {
    if user_action_allowed(actor, target_user_id, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not allowed to {} this user",
            action.as_str()
        )))
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::new(1, "root", ROLE_ADMIN)
    }

    fn agent(id: DbId) -> Actor {
        Actor::new(id, "agent", ROLE_AGENT)
    }

    fn client(id: DbId) -> Actor {
        Actor::new(id, "client", ROLE_CLIENT)
    }

    const ALL_ACTIONS: &[Action] = &[Action::Read, Action::Update, Action::Delete, Action::Comment];

    #[test]
    fn admin_is_allowed_everything() {
        let ticket = TicketRefs {
            user_id: 10,
            agent_id: Some(20),
        };
        for &action in ALL_ACTIONS {
            assert!(ticket_action_allowed(&admin(), &ticket, action));
            assert!(department_action_allowed(&admin(), action));
            assert!(user_action_allowed(&admin(), 99, action));
        }
        assert!(comment_delete_allowed(&admin(), 99));
    }

    #[test]
    fn client_allowed_only_on_own_ticket() {
        let own = TicketRefs {
            user_id: 10,
            agent_id: None,
        };
        let foreign = TicketRefs {
            user_id: 11,
            agent_id: None,
        };
        let actor = client(10);

        assert!(ticket_action_allowed(&actor, &own, Action::Read));
        assert!(ticket_action_allowed(&actor, &own, Action::Update));
        assert!(ticket_action_allowed(&actor, &own, Action::Comment));

        for &action in ALL_ACTIONS {
            assert!(
                !ticket_action_allowed(&actor, &foreign, action),
                "client must be denied {action:?} on a foreign ticket"
            );
        }
    }

    #[test]
    fn reporter_may_delete_own_ticket() {
        let own = TicketRefs {
            user_id: 10,
            agent_id: Some(20),
        };
        assert!(ticket_action_allowed(&client(10), &own, Action::Delete));
        assert!(!ticket_action_allowed(&client(11), &own, Action::Delete));
    }

    #[test]
    fn agent_allowed_on_assigned_and_unassigned_tickets() {
        let unassigned = TicketRefs {
            user_id: 10,
            agent_id: None,
        };
        let mine = TicketRefs {
            user_id: 10,
            agent_id: Some(20),
        };
        let someone_elses = TicketRefs {
            user_id: 10,
            agent_id: Some(21),
        };
        let actor = agent(20);

        assert!(ticket_action_allowed(&actor, &unassigned, Action::Read));
        assert!(ticket_action_allowed(&actor, &unassigned, Action::Update));
        assert!(ticket_action_allowed(&actor, &mine, Action::Update));
        assert!(ticket_action_allowed(&actor, &mine, Action::Comment));

        assert!(!ticket_action_allowed(&actor, &someone_elses, Action::Read));
        assert!(!ticket_action_allowed(&actor, &someone_elses, Action::Update));
    }

    #[test]
    fn agent_may_not_delete_unassigned_ticket() {
        let unassigned = TicketRefs {
            user_id: 10,
            agent_id: None,
        };
        assert!(!ticket_action_allowed(&agent(20), &unassigned, Action::Delete));
    }

    #[test]
    fn comment_author_may_delete_own_comment() {
        assert!(comment_delete_allowed(&client(10), 10));
        assert!(!comment_delete_allowed(&client(10), 11));
        assert!(comment_delete_allowed(&agent(20), 20));
    }

    #[test]
    fn department_reads_open_mutations_admin_only() {
        for actor in [agent(20), client(10)] {
            assert!(department_action_allowed(&actor, Action::Read));
            assert!(!department_action_allowed(&actor, Action::Update));
            assert!(!department_action_allowed(&actor, Action::Delete));
        }
    }

    #[test]
    fn user_self_access() {
        let actor = client(10);
        assert!(user_action_allowed(&actor, 10, Action::Read));
        assert!(user_action_allowed(&actor, 10, Action::Update));
        assert!(!user_action_allowed(&actor, 10, Action::Delete));
        assert!(!user_action_allowed(&actor, 11, Action::Read));
        assert!(!user_action_allowed(&actor, 11, Action::Update));
    }

    #[test]
    fn authorize_wrappers_return_forbidden() {
        let foreign = TicketRefs {
            user_id: 11,
            agent_id: None,
        };
        let err = authorize_ticket(&client(10), &foreign, Action::Update).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let err = authorize_department(&client(10), Action::Delete).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
