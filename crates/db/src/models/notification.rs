//! Notification entity models and DTOs.

use helpdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// `related_id`/`related_type` are a weak reference: the subject may be
/// deleted independently, at which point the cascade removes these rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    /// Recipient.
    pub user_id: DbId,
    pub message: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub related_id: Option<DbId>,
    pub related_type: Option<String>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub message: String,
    pub kind: String,
    pub related_id: Option<DbId>,
    pub related_type: Option<String>,
}
