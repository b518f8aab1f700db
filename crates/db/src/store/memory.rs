//! In-memory [`EntityStore`] for tests.
//!
//! Mirrors the Postgres semantics the pipeline relies on: id allocation,
//! unique-constraint conflicts for usernames/emails/department names, and
//! the optimistic `updated_at` check on ticket updates. Failure injection
//! hooks let tests exercise the best-effort audit/notification paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use helpdesk_core::error::CoreError;
use helpdesk_core::roles::ROLE_AGENT;
use helpdesk_core::types::{DbId, Timestamp};

use crate::models::activity::{ActivityLogEntry, NewActivityEntry};
use crate::models::comment::Comment;
use crate::models::department::{CreateDepartment, Department, DepartmentWrite};
use crate::models::notification::{NewNotification, Notification};
use crate::models::ticket::{NewTicket, Ticket, TicketWrite};
use crate::models::user::{NewUser, User, UserWrite};

use super::EntityStore;

#[derive(Default)]
struct Inner {
    users: BTreeMap<DbId, User>,
    departments: BTreeMap<DbId, Department>,
    tickets: BTreeMap<DbId, Ticket>,
    comments: BTreeMap<DbId, Comment>,
    activity: Vec<ActivityLogEntry>,
    notifications: Vec<Notification>,
    next_id: DbId,
    fail_activity: bool,
    fail_notifications_for: Option<DbId>,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory entity store. Cheap to construct, safe to share.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /* ----------------------------------------------------------------------
    Test helpers
    ---------------------------------------------------------------------- */

    /// Insert a user directly, bypassing validation. The email is derived
    /// from the username.
    pub fn seed_user(&self, username: &str, role: &str, department_id: Option<DbId>) -> User {
        let mut inner = self.lock();
        let now = Utc::now();
        let id = inner.next_id();
        let user = User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
            role: role.to_string(),
            department_id,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, user.clone());
        user
    }

    /// Insert a department directly, bypassing validation.
    pub fn seed_department(&self, name: &str) -> Department {
        let mut inner = self.lock();
        let now = Utc::now();
        let id = inner.next_id();
        let department = Department {
            id,
            name: name.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        inner.departments.insert(id, department.clone());
        department
    }

    /// All notification rows written so far, in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// All activity log entries written so far, in insertion order.
    pub fn activity(&self) -> Vec<ActivityLogEntry> {
        self.lock().activity.clone()
    }

    /// Make every subsequent `append_activity` fail.
    pub fn set_fail_activity(&self, fail: bool) {
        self.lock().fail_activity = fail;
    }

    /// Make `insert_notification` fail for one recipient.
    pub fn set_fail_notifications_for(&self, user_id: Option<DbId>) {
        self.lock().fail_notifications_for = user_id;
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    // --- Users ---

    async fn get_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, CoreError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_users_username ({})",
                user.username
            )));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_users_email ({})",
                user.email
            )));
        }
        let now = Utc::now();
        let id = inner.next_id();
        let row = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
            department_id: user.department_id,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, row.clone());
        Ok(row)
    }

    async fn update_user(&self, id: DbId, write: &UserWrite) -> Result<Option<User>, CoreError> {
        let mut inner = self.lock();
        if let Some(ref username) = write.username {
            if inner
                .users
                .values()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: uq_users_username ({username})"
                )));
            }
        }
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(ref username) = write.username {
            user.username = username.clone();
        }
        if let Some(ref email) = write.email {
            user.email = email.clone();
        }
        if let Some(ref role) = write.role {
            user.role = role.clone();
        }
        if let Some(department_id) = write.department_id {
            user.department_id = department_id;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().users.remove(&id).is_some())
    }

    async fn list_users_by_role(&self, role: &str) -> Result<Vec<User>, CoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn list_agents_in_department(
        &self,
        department_id: DbId,
    ) -> Result<Vec<User>, CoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.role == ROLE_AGENT && u.department_id == Some(department_id))
            .cloned()
            .collect())
    }

    // --- Departments ---

    async fn get_department(&self, id: DbId) -> Result<Option<Department>, CoreError> {
        Ok(self.lock().departments.get(&id).cloned())
    }

    async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Department>, CoreError> {
        Ok(self
            .lock()
            .departments
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn insert_department(
        &self,
        department: &CreateDepartment,
    ) -> Result<Department, CoreError> {
        let mut inner = self.lock();
        if inner.departments.values().any(|d| d.name == department.name) {
            return Err(CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: uq_departments_name ({})",
                department.name
            )));
        }
        let now = Utc::now();
        let id = inner.next_id();
        let row = Department {
            id,
            name: department.name.clone(),
            description: department.description.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.departments.insert(id, row.clone());
        Ok(row)
    }

    async fn update_department(
        &self,
        id: DbId,
        write: &DepartmentWrite,
    ) -> Result<Option<Department>, CoreError> {
        let mut inner = self.lock();
        if let Some(ref name) = write.name {
            if inner.departments.values().any(|d| d.id != id && &d.name == name) {
                return Err(CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: uq_departments_name ({name})"
                )));
            }
        }
        let Some(department) = inner.departments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(ref name) = write.name {
            department.name = name.clone();
        }
        if let Some(ref description) = write.description {
            department.description = description.clone();
        }
        department.updated_at = Utc::now();
        Ok(Some(department.clone()))
    }

    async fn delete_department(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().departments.remove(&id).is_some())
    }

    async fn count_tickets_in_department(&self, department_id: DbId) -> Result<i64, CoreError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .filter(|t| t.department_id == department_id)
            .count() as i64)
    }

    // --- Tickets ---

    async fn get_ticket(&self, id: DbId) -> Result<Option<Ticket>, CoreError> {
        Ok(self.lock().tickets.get(&id).cloned())
    }

    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, CoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        let id = inner.next_id();
        let row = Ticket {
            id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status.clone(),
            priority: ticket.priority.clone(),
            department_id: ticket.department_id,
            user_id: ticket.user_id,
            agent_id: ticket.agent_id,
            created_at: now,
            updated_at: now,
            closed_at: None,
        };
        inner.tickets.insert(id, row.clone());
        Ok(row)
    }

    async fn update_ticket(
        &self,
        id: DbId,
        write: &TicketWrite,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Ticket>, CoreError> {
        let mut inner = self.lock();
        let Some(ticket) = inner.tickets.get_mut(&id) else {
            return Ok(None);
        };
        // Optimistic check: the row must still be in the state the caller read.
        if ticket.updated_at != expected_updated_at {
            return Ok(None);
        }
        if let Some(ref title) = write.title {
            ticket.title = title.clone();
        }
        if let Some(ref description) = write.description {
            ticket.description = description.clone();
        }
        if let Some(ref status) = write.status {
            ticket.status = status.clone();
        }
        if let Some(ref priority) = write.priority {
            ticket.priority = priority.clone();
        }
        if let Some(department_id) = write.department_id {
            ticket.department_id = department_id;
        }
        if let Some(agent_id) = write.agent_id {
            ticket.agent_id = agent_id;
        }
        if let Some(closed_at) = write.closed_at {
            ticket.closed_at = closed_at;
        }
        ticket.updated_at = Utc::now();
        Ok(Some(ticket.clone()))
    }

    async fn delete_ticket(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().tickets.remove(&id).is_some())
    }

    // --- Comments ---

    async fn get_comment(&self, id: DbId) -> Result<Option<Comment>, CoreError> {
        Ok(self.lock().comments.get(&id).cloned())
    }

    async fn insert_comment(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<Comment, CoreError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let row = Comment {
            id,
            ticket_id,
            user_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().comments.remove(&id).is_some())
    }

    async fn delete_comments_for_ticket(&self, ticket_id: DbId) -> Result<u64, CoreError> {
        let mut inner = self.lock();
        let before = inner.comments.len();
        inner.comments.retain(|_, c| c.ticket_id != ticket_id);
        Ok((before - inner.comments.len()) as u64)
    }

    // --- Activity log ---

    async fn last_activity_hash(&self) -> Result<Option<String>, CoreError> {
        Ok(self
            .lock()
            .activity
            .last()
            .and_then(|e| e.integrity_hash.clone()))
    }

    async fn append_activity(
        &self,
        entry: &NewActivityEntry,
    ) -> Result<ActivityLogEntry, CoreError> {
        let mut inner = self.lock();
        if inner.fail_activity {
            return Err(CoreError::Internal("injected activity failure".to_string()));
        }
        let id = inner.next_id();
        let row = ActivityLogEntry {
            id,
            actor_id: entry.actor_id,
            actor_username: entry.actor_username.clone(),
            actor_role: entry.actor_role.clone(),
            action_type: entry.action_type.clone(),
            description: entry.description.clone(),
            target_type: entry.target_type.clone(),
            target_id: entry.target_id,
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            integrity_hash: entry.integrity_hash.clone(),
            created_at: Utc::now(),
        };
        inner.activity.push(row.clone());
        Ok(row)
    }

    async fn delete_activity_for_target(
        &self,
        target_type: &str,
        target_id: DbId,
    ) -> Result<u64, CoreError> {
        let mut inner = self.lock();
        let before = inner.activity.len();
        inner
            .activity
            .retain(|e| !(e.target_type == target_type && e.target_id == target_id));
        Ok((before - inner.activity.len()) as u64)
    }

    // --- Notifications ---

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError> {
        let mut inner = self.lock();
        if inner.fail_notifications_for == Some(notification.user_id) {
            return Err(CoreError::Internal(
                "injected notification failure".to_string(),
            ));
        }
        let id = inner.next_id();
        let row = Notification {
            id,
            user_id: notification.user_id,
            message: notification.message.clone(),
            kind: notification.kind.clone(),
            related_id: notification.related_id,
            related_type: notification.related_type.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        inner.notifications.push(row.clone());
        Ok(row)
    }

    async fn delete_notifications_for_related(
        &self,
        related_type: &str,
        related_id: DbId,
    ) -> Result<u64, CoreError> {
        let mut inner = self.lock();
        let before = inner.notifications.len();
        inner.notifications.retain(|n| {
            !(n.related_type.as_deref() == Some(related_type) && n.related_id == Some(related_id))
        });
        Ok((before - inner.notifications.len()) as u64)
    }
}
