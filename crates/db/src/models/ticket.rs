//! Ticket entity models and DTOs.

use helpdesk_core::diff::Snapshot;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::double_option;

/// A row from the `tickets` table.
///
/// Invariant: `closed_at` is non-null exactly when `status = 'closed'`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub department_id: DbId,
    /// Owner (reporter).
    pub user_id: DbId,
    /// Assigned agent, if any.
    pub agent_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl Ticket {
    /// Snapshot of the tracked (diffable) fields.
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        map.insert("title".into(), Value::String(self.title.clone()));
        map.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        map.insert("status".into(), Value::String(self.status.clone()));
        map.insert("priority".into(), Value::String(self.priority.clone()));
        map.insert("department_id".into(), Value::from(self.department_id));
        map.insert(
            "agent_id".into(),
            self.agent_id.map_or(Value::Null, Value::from),
        );
        map
    }
}

/// Request DTO for creating a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    /// Defaults to `medium`.
    pub priority: Option<String>,
    pub department_id: DbId,
    /// Admin-only: file the ticket on behalf of this user.
    pub user_id: Option<DbId>,
}

/// Insert record with server-decided fields filled in.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub department_id: DbId,
    pub user_id: DbId,
    pub agent_id: Option<DbId>,
}

/// Request DTO for updating a ticket. Absent fields are left unchanged;
/// `agent_id: null` unassigns the ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub department_id: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub agent_id: Option<Option<DbId>>,
}

impl UpdateTicket {
    /// Snapshot of the requested changes (absent fields omitted).
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        if let Some(ref title) = self.title {
            map.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(ref description) = self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(ref status) = self.status {
            map.insert("status".into(), Value::String(status.clone()));
        }
        if let Some(ref priority) = self.priority {
            map.insert("priority".into(), Value::String(priority.clone()));
        }
        if let Some(department_id) = self.department_id {
            map.insert("department_id".into(), Value::from(department_id));
        }
        if let Some(agent_id) = self.agent_id {
            map.insert("agent_id".into(), agent_id.map_or(Value::Null, Value::from));
        }
        map
    }
}

/// Staged field writes for a ticket, applied in a single store call
/// together with the derived `closed_at` adjustment.
#[derive(Debug, Clone, Default)]
pub struct TicketWrite {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub department_id: Option<DbId>,
    pub agent_id: Option<Option<DbId>>,
    pub closed_at: Option<Option<Timestamp>>,
}

impl TicketWrite {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.department_id.is_none()
            && self.agent_id.is_none()
            && self.closed_at.is_none()
    }
}
