//! Department entity models and DTOs.

use helpdesk_core::diff::Snapshot;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::double_option;

/// A row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Department {
    /// Snapshot of the tracked (diffable) fields.
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert(
            "description".into(),
            self.description
                .clone()
                .map_or(Value::Null, Value::String),
        );
        map
    }
}

/// Request DTO for creating a department.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub description: Option<String>,
}

/// Request DTO for updating a department. Absent fields are left unchanged;
/// `description: null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateDepartment {
    /// Snapshot of the requested changes (absent fields omitted).
    pub fn snapshot(&self) -> Snapshot {
        let mut map = Snapshot::new();
        if let Some(ref name) = self.name {
            map.insert("name".into(), Value::String(name.clone()));
        }
        if let Some(ref description) = self.description {
            map.insert(
                "description".into(),
                description.clone().map_or(Value::Null, Value::String),
            );
        }
        map
    }
}

/// Staged field writes for a department, applied in a single store call.
#[derive(Debug, Clone, Default)]
pub struct DepartmentWrite {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl DepartmentWrite {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
