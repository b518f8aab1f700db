//! [`EntityStore`] implementation over the Postgres repositories.

use async_trait::async_trait;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::{DbId, Timestamp};

use crate::models::activity::{ActivityLogEntry, NewActivityEntry};
use crate::models::comment::Comment;
use crate::models::department::{CreateDepartment, Department, DepartmentWrite};
use crate::models::notification::{NewNotification, Notification};
use crate::models::ticket::{NewTicket, Ticket, TicketWrite};
use crate::models::user::{NewUser, User, UserWrite};
use crate::repositories::{
    ActivityLogRepo, CommentRepo, DepartmentRepo, NotificationRepo, TicketRepo, UserRepo,
};
use crate::DbPool;

use super::EntityStore;

/// Production entity store backed by a [`DbPool`].
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Classify a sqlx error into the domain taxonomy.
///
/// - Unique constraint violations (Postgres code 23505) map to `Conflict`.
/// - Foreign-key violations (23503) map to `Validation` (the write referenced
///   a row that does not exist).
/// - Everything else maps to `Internal` with a sanitized message.
fn map_db_err(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some("23503") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Validation(format!(
                    "Write references a missing row: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("Database operation failed".to_string())
}

#[async_trait]
impl EntityStore for PgStore {
    // --- Users ---

    async fn get_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_id(&self.pool, id).await.map_err(map_db_err)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(map_db_err)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(map_db_err)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, CoreError> {
        UserRepo::create(&self.pool, user).await.map_err(map_db_err)
    }

    async fn update_user(&self, id: DbId, write: &UserWrite) -> Result<Option<User>, CoreError> {
        UserRepo::update(&self.pool, id, write)
            .await
            .map_err(map_db_err)
    }

    async fn delete_user(&self, id: DbId) -> Result<bool, CoreError> {
        UserRepo::delete(&self.pool, id).await.map_err(map_db_err)
    }

    async fn list_users_by_role(&self, role: &str) -> Result<Vec<User>, CoreError> {
        UserRepo::list_by_role(&self.pool, role)
            .await
            .map_err(map_db_err)
    }

    async fn list_agents_in_department(
        &self,
        department_id: DbId,
    ) -> Result<Vec<User>, CoreError> {
        UserRepo::list_agents_in_department(&self.pool, department_id)
            .await
            .map_err(map_db_err)
    }

    // --- Departments ---

    async fn get_department(&self, id: DbId) -> Result<Option<Department>, CoreError> {
        DepartmentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)
    }

    async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Department>, CoreError> {
        DepartmentRepo::find_by_name(&self.pool, name)
            .await
            .map_err(map_db_err)
    }

    async fn insert_department(
        &self,
        department: &CreateDepartment,
    ) -> Result<Department, CoreError> {
        DepartmentRepo::create(&self.pool, department)
            .await
            .map_err(map_db_err)
    }

    async fn update_department(
        &self,
        id: DbId,
        write: &DepartmentWrite,
    ) -> Result<Option<Department>, CoreError> {
        DepartmentRepo::update(&self.pool, id, write)
            .await
            .map_err(map_db_err)
    }

    async fn delete_department(&self, id: DbId) -> Result<bool, CoreError> {
        DepartmentRepo::delete(&self.pool, id)
            .await
            .map_err(map_db_err)
    }

    async fn count_tickets_in_department(&self, department_id: DbId) -> Result<i64, CoreError> {
        TicketRepo::count_by_department(&self.pool, department_id)
            .await
            .map_err(map_db_err)
    }

    // --- Tickets ---

    async fn get_ticket(&self, id: DbId) -> Result<Option<Ticket>, CoreError> {
        TicketRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)
    }

    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, CoreError> {
        TicketRepo::create(&self.pool, ticket)
            .await
            .map_err(map_db_err)
    }

    async fn update_ticket(
        &self,
        id: DbId,
        write: &TicketWrite,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Ticket>, CoreError> {
        TicketRepo::update_checked(&self.pool, id, write, expected_updated_at)
            .await
            .map_err(map_db_err)
    }

    async fn delete_ticket(&self, id: DbId) -> Result<bool, CoreError> {
        TicketRepo::delete(&self.pool, id).await.map_err(map_db_err)
    }

    // --- Comments ---

    async fn get_comment(&self, id: DbId) -> Result<Option<Comment>, CoreError> {
        CommentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)
    }

    async fn insert_comment(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<Comment, CoreError> {
        CommentRepo::create(&self.pool, ticket_id, user_id, text)
            .await
            .map_err(map_db_err)
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, CoreError> {
        CommentRepo::delete(&self.pool, id).await.map_err(map_db_err)
    }

    async fn delete_comments_for_ticket(&self, ticket_id: DbId) -> Result<u64, CoreError> {
        CommentRepo::delete_for_ticket(&self.pool, ticket_id)
            .await
            .map_err(map_db_err)
    }

    // --- Activity log ---

    async fn last_activity_hash(&self) -> Result<Option<String>, CoreError> {
        ActivityLogRepo::find_last_hash(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn append_activity(
        &self,
        entry: &NewActivityEntry,
    ) -> Result<ActivityLogEntry, CoreError> {
        ActivityLogRepo::insert(&self.pool, entry)
            .await
            .map_err(map_db_err)
    }

    async fn delete_activity_for_target(
        &self,
        target_type: &str,
        target_id: DbId,
    ) -> Result<u64, CoreError> {
        ActivityLogRepo::delete_for_target(&self.pool, target_type, target_id)
            .await
            .map_err(map_db_err)
    }

    // --- Notifications ---

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError> {
        NotificationRepo::create(&self.pool, notification)
            .await
            .map_err(map_db_err)
    }

    async fn delete_notifications_for_related(
        &self,
        related_type: &str,
        related_id: DbId,
    ) -> Result<u64, CoreError> {
        NotificationRepo::delete_for_related(&self.pool, related_type, related_id)
            .await
            .map_err(map_db_err)
    }
}
