//! Repository for the `activity_log` table.
//!
//! Entries are append-only; there is no update method by design of the
//! schema (the table carries no `updated_at`).

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{ActivityLogEntry, ActivityQuery, NewActivityEntry};

/// Column list for `activity_log` queries.
const COLUMNS: &str = "\
    id, actor_id, actor_username, actor_role, action_type, description, \
    target_type, target_id, old_value, new_value, integrity_hash, created_at";

/// Provides append and query operations for the activity log.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append a new entry, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        entry: &NewActivityEntry,
    ) -> Result<ActivityLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_log \
             (actor_id, actor_username, actor_role, action_type, description, \
              target_type, target_id, old_value, new_value, integrity_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(entry.actor_id)
            .bind(&entry.actor_username)
            .bind(&entry.actor_role)
            .bind(&entry.action_type)
            .bind(&entry.description)
            .bind(&entry.target_type)
            .bind(entry.target_id)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.integrity_hash)
            .fetch_one(pool)
            .await
    }

    /// Find the integrity hash of the most recent entry.
    pub async fn find_last_hash(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT integrity_hash FROM activity_log ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await
        .map(|opt| opt.flatten())
    }

    /// List the entries targeting one entity, oldest first (ticket history).
    pub async fn list_for_target(
        pool: &PgPool,
        target_type: &str,
        target_id: DbId,
    ) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log \
             WHERE target_type = $1 AND target_id = $2 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(target_type)
            .bind(target_id)
            .fetch_all(pool)
            .await
    }

    /// Query entries with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &ActivityQuery,
    ) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;
        let mut bind_values: Vec<BindValue> = Vec::new();

        if let Some(actor_id) = params.actor_id {
            conditions.push(format!("actor_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::BigInt(actor_id));
        }
        if let Some(ref action_type) = params.action_type {
            conditions.push(format!("action_type = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(action_type.clone()));
        }
        if let Some(ref target_type) = params.target_type {
            conditions.push(format!("target_type = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(target_type.clone()));
        }
        if let Some(target_id) = params.target_id {
            conditions.push(format!("target_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::BigInt(target_id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM activity_log {where_clause} \
             ORDER BY id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, ActivityLogEntry>(&query);
        for val in &bind_values {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
            }
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Delete all entries targeting one entity (cascading ticket deletion).
    /// Returns the number of rows removed.
    pub async fn delete_for_target(
        pool: &PgPool,
        target_type: &str,
        target_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activity_log WHERE target_type = $1 AND target_id = $2")
            .bind(target_type)
            .bind(target_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Typed bind value for the dynamically-built query.
enum BindValue {
    BigInt(DbId),
    Text(String),
}
