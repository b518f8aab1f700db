//! Activity log entity models and DTOs.
//!
//! Activity log entries are the audit trail: immutable once created (no
//! `updated_at`), never modified, deleted only when a cascading ticket
//! deletion removes the entries targeting that ticket.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activity_log` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLogEntry {
    pub id: DbId,
    pub actor_id: DbId,
    /// Denormalized snapshot; survives the actor's later deletion or rename.
    pub actor_username: String,
    pub actor_role: String,
    pub action_type: String,
    pub description: String,
    pub target_type: String,
    pub target_id: DbId,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// SHA-256 chain over preceding entries; null only if recording raced.
    pub integrity_hash: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a new activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivityEntry {
    pub actor_id: DbId,
    pub actor_username: String,
    pub actor_role: String,
    pub action_type: String,
    pub description: String,
    pub target_type: String,
    pub target_id: DbId,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub integrity_hash: Option<String>,
}

/// Filter parameters for querying the activity log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub actor_id: Option<DbId>,
    pub action_type: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
