//! Comment entity models and DTOs. Comments are append-only.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub created_at: Timestamp,
}

/// Request DTO for adding a comment to a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub text: String,
}
