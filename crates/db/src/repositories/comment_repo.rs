//! Repository for the `comments` table.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::Comment;

/// Column list for `comments` queries.
const COLUMNS: &str = "id, ticket_id, user_id, text, created_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
        text: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (ticket_id, user_id, text) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(text)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a ticket's comments, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE ticket_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all comments of a ticket (cascading ticket deletion).
    /// Returns the number of rows removed.
    pub async fn delete_for_ticket(pool: &PgPool, ticket_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
