//! User entity models and DTOs.

use helpdesk_core::diff::Snapshot;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::double_option;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// Argon2 hash; never serialized into responses or audit snapshots.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub department_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Snapshot of the tracked (diffable) fields.
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        map.insert("username".into(), Value::String(self.username.clone()));
        map.insert("email".into(), Value::String(self.email.clone()));
        map.insert("role".into(), Value::String(self.role.clone()));
        map.insert(
            "department_id".into(),
            self.department_id.map_or(Value::Null, Value::from),
        );
        map
    }
}

/// Request DTO for creating a user (registration or admin creation).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Admin creation only; registration always yields a client.
    pub role: Option<String>,
    pub department_id: Option<DbId>,
}

/// Insert record with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department_id: Option<DbId>,
}

/// Request DTO for updating a user. Absent fields are left unchanged;
/// `department_id: null` clears the assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<DbId>>,
}

impl UpdateUser {
    /// Snapshot of the requested changes (absent fields omitted).
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        if let Some(ref username) = self.username {
            map.insert("username".into(), Value::String(username.clone()));
        }
        if let Some(ref email) = self.email {
            map.insert("email".into(), Value::String(email.clone()));
        }
        if let Some(ref role) = self.role {
            map.insert("role".into(), Value::String(role.clone()));
        }
        if let Some(department_id) = self.department_id {
            map.insert(
                "department_id".into(),
                department_id.map_or(Value::Null, Value::from),
            );
        }
        map
    }
}

/// Staged field writes for a user, applied in a single store call.
#[derive(Debug, Clone, Default)]
pub struct UserWrite {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department_id: Option<Option<DbId>>,
}

impl UserWrite {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.department_id.is_none()
    }
}
