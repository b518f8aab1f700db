//! Repository for the `tickets` table.
//!
//! Updates go through [`TicketRepo::update_checked`], an optimistic
//! compare-and-swap on `updated_at`: the UPDATE only matches when the row is
//! still in the state the caller read, which closes the read-modify-write
//! race between two concurrent updaters.

use helpdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::ticket::{NewTicket, Ticket, TicketWrite};

/// Column list for `tickets` queries.
const COLUMNS: &str = "\
    id, title, description, status, priority, department_id, \
    user_id, agent_id, created_at, updated_at, closed_at";

/// Provides CRUD operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket, returning the stored row.
    pub async fn create(pool: &PgPool, ticket: &NewTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (title, description, status, priority, department_id, user_id, agent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(&ticket.status)
            .bind(&ticket.priority)
            .bind(ticket.department_id)
            .bind(ticket.user_id)
            .bind(ticket.agent_id)
            .fetch_one(pool)
            .await
    }

    /// Find a ticket by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all tickets, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets ORDER BY created_at DESC");
        sqlx::query_as::<_, Ticket>(&query).fetch_all(pool).await
    }

    /// List tickets owned by a user, newest first.
    pub async fn list_for_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the tickets visible to an agent: assigned to them, or unassigned
    /// within their department.
    pub async fn list_for_agent(
        pool: &PgPool,
        agent_id: DbId,
        department_id: Option<DbId>,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE agent_id = $1 OR (agent_id IS NULL AND department_id = $2) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(agent_id)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }

    /// Apply staged field writes in a single UPDATE, guarded by an
    /// optimistic check on `updated_at`.
    ///
    /// Returns `None` when the row is gone or was modified since the caller
    /// read `expected_updated_at`; the caller re-reads and retries.
    pub async fn update_checked(
        pool: &PgPool,
        id: DbId,
        write: &TicketWrite,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx = 3u32; // $1 is the id, $2 the expected updated_at
        let mut bind_values: Vec<BindValue> = Vec::new();

        if let Some(ref title) = write.title {
            sets.push(format!("title = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(title.clone()));
        }
        if let Some(ref description) = write.description {
            sets.push(format!("description = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(description.clone()));
        }
        if let Some(ref status) = write.status {
            sets.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(status.clone()));
        }
        if let Some(ref priority) = write.priority {
            sets.push(format!("priority = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(priority.clone()));
        }
        if let Some(department_id) = write.department_id {
            sets.push(format!("department_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::BigInt(department_id));
        }
        if let Some(agent_id) = write.agent_id {
            sets.push(format!("agent_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::NullableBigInt(agent_id));
        }
        if let Some(closed_at) = write.closed_at {
            sets.push(format!("closed_at = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(BindValue::NullableTimestamp(closed_at));
        }

        sets.push("updated_at = NOW()".to_string());

        let query = format!(
            "UPDATE tickets SET {} \
             WHERE id = $1 AND updated_at = $2 \
             RETURNING {COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(expected_updated_at);
        for val in &bind_values {
            match val {
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::NullableBigInt(v) => q = q.bind(*v),
                BindValue::NullableTimestamp(v) => q = q.bind(*v),
            }
        }
        q.fetch_optional(pool).await
    }

    /// Delete a ticket. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count tickets referencing a department (blocks department deletion).
    pub async fn count_by_department(
        pool: &PgPool,
        department_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM tickets WHERE department_id = $1")
            .bind(department_id)
            .fetch_one(pool)
            .await
    }
}

/// Typed bind value for the dynamically-built UPDATE.
enum BindValue {
    Text(String),
    BigInt(DbId),
    NullableBigInt(Option<DbId>),
    NullableTimestamp(Option<Timestamp>),
}
