//! The injected entity-store seam consumed by the mutation pipeline.
//!
//! [`EntityStore`] captures exactly the read-modify-write surface the
//! pipeline needs: typed get/insert/update/delete per entity, the audit
//! append, and the notification insert. Production uses [`PgStore`] over the
//! repositories; tests substitute [`MemoryStore`] and exercise the full
//! pipeline without a database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::{DbId, Timestamp};

use crate::models::activity::{ActivityLogEntry, NewActivityEntry};
use crate::models::comment::Comment;
use crate::models::department::{CreateDepartment, Department, DepartmentWrite};
use crate::models::notification::{NewNotification, Notification};
use crate::models::ticket::{NewTicket, Ticket, TicketWrite};
use crate::models::user::{NewUser, User, UserWrite};

/// Read-modify-write operations over persistent entities.
///
/// All errors are reported in the domain taxonomy ([`CoreError`]); the
/// Postgres implementation classifies driver errors (unique violations ->
/// `Conflict`, foreign-key violations -> `Validation`) so callers never see
/// transport details.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users ---

    async fn get_user(&self, id: DbId) -> Result<Option<User>, CoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;
    async fn insert_user(&self, user: &NewUser) -> Result<User, CoreError>;
    async fn update_user(&self, id: DbId, write: &UserWrite) -> Result<Option<User>, CoreError>;
    async fn delete_user(&self, id: DbId) -> Result<bool, CoreError>;
    async fn list_users_by_role(&self, role: &str) -> Result<Vec<User>, CoreError>;
    async fn list_agents_in_department(
        &self,
        department_id: DbId,
    ) -> Result<Vec<User>, CoreError>;

    // --- Departments ---

    async fn get_department(&self, id: DbId) -> Result<Option<Department>, CoreError>;
    async fn find_department_by_name(&self, name: &str)
        -> Result<Option<Department>, CoreError>;
    async fn insert_department(
        &self,
        department: &CreateDepartment,
    ) -> Result<Department, CoreError>;
    async fn update_department(
        &self,
        id: DbId,
        write: &DepartmentWrite,
    ) -> Result<Option<Department>, CoreError>;
    async fn delete_department(&self, id: DbId) -> Result<bool, CoreError>;
    async fn count_tickets_in_department(&self, department_id: DbId) -> Result<i64, CoreError>;

    // --- Tickets ---

    async fn get_ticket(&self, id: DbId) -> Result<Option<Ticket>, CoreError>;
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, CoreError>;

    /// Apply staged writes guarded by an optimistic check on `updated_at`.
    /// Returns `None` when the row is gone or stale; the caller re-reads and
    /// retries.
    async fn update_ticket(
        &self,
        id: DbId,
        write: &TicketWrite,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Ticket>, CoreError>;
    async fn delete_ticket(&self, id: DbId) -> Result<bool, CoreError>;

    // --- Comments ---

    async fn get_comment(&self, id: DbId) -> Result<Option<Comment>, CoreError>;
    async fn insert_comment(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<Comment, CoreError>;
    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError>;
    async fn delete_comments_for_ticket(&self, ticket_id: DbId) -> Result<u64, CoreError>;

    // --- Activity log ---

    async fn last_activity_hash(&self) -> Result<Option<String>, CoreError>;
    async fn append_activity(
        &self,
        entry: &NewActivityEntry,
    ) -> Result<ActivityLogEntry, CoreError>;
    async fn delete_activity_for_target(
        &self,
        target_type: &str,
        target_id: DbId,
    ) -> Result<u64, CoreError>;

    // --- Notifications ---

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError>;
    async fn delete_notifications_for_related(
        &self,
        related_type: &str,
        related_id: DbId,
    ) -> Result<u64, CoreError>;
}
