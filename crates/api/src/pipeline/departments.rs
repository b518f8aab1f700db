//! Department workflows. Mutations are admin-only; updates write one
//! composed audit entry rather than one per field.

use helpdesk_core::audit::{self, action_types, target_types};
use helpdesk_core::department;
use helpdesk_core::diff;
use helpdesk_core::error::CoreError;
use helpdesk_core::policy::{self, Action, Actor};
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::models::department::{
    CreateDepartment, Department, DepartmentWrite, UpdateDepartment,
};
use helpdesk_db::store::EntityStore;
use serde_json::Value;

use super::MutationPipeline;

impl<S: EntityStore> MutationPipeline<S> {
    /// Create a department (admin-only).
    pub async fn create_department(
        &self,
        actor: &Actor,
        input: &CreateDepartment,
    ) -> Result<Department, CoreError> {
        policy::authorize_department(actor, Action::Update)?;
        department::validate_name(&input.name)?;

        if self
            .store()
            .find_department_by_name(&input.name)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Department '{}' already exists",
                input.name
            )));
        }

        let created = self.store().insert_department(input).await?;

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::DEPARTMENT_CREATED.to_string(),
            description: format!("Department '{}' created", created.name),
            target_type: target_types::DEPARTMENT.to_string(),
            target_id: created.id,
            old_value: None,
            new_value: audit::serialize_value(&Value::Object(created.snapshot())),
            integrity_hash: None,
        }])
        .await;

        Ok(created)
    }

    /// Update a department (admin-only). Writes one composed audit entry
    /// covering all changed fields.
    pub async fn update_department(
        &self,
        actor: &Actor,
        id: DbId,
        input: &UpdateDepartment,
    ) -> Result<Department, CoreError> {
        policy::authorize_department(actor, Action::Update)?;
        if let Some(ref name) = input.name {
            department::validate_name(name)?;
        }

        let current = self
            .store()
            .get_department(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Department",
                id,
            })?;

        let changes = diff::diff_snapshots(
            &current.snapshot(),
            &input.snapshot(),
            diff::DEPARTMENT_FIELDS,
        );
        if changes.is_empty() {
            return Ok(current);
        }

        if let Some(ref name) = input.name {
            if let Some(existing) = self.store().find_department_by_name(name).await? {
                if existing.id != id {
                    return Err(CoreError::Conflict(format!(
                        "Department '{name}' already exists"
                    )));
                }
            }
        }

        let mut write = DepartmentWrite::default();
        for change in &changes {
            match change.field.as_str() {
                "name" => write.name = input.name.clone(),
                "description" => write.description = input.description.clone(),
                _ => {}
            }
        }

        let updated = self
            .store()
            .update_department(id, &write)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Department",
                id,
            })?;

        let summary: Vec<String> = changes.iter().map(|c| c.describe()).collect();
        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::DEPARTMENT_UPDATED.to_string(),
            description: format!("Department '{}': {}", updated.name, summary.join("; ")),
            target_type: target_types::DEPARTMENT.to_string(),
            target_id: id,
            old_value: audit::serialize_value(&Value::Object(current.snapshot())),
            new_value: audit::serialize_value(&Value::Object(updated.snapshot())),
            integrity_hash: None,
        }])
        .await;

        Ok(updated)
    }

    /// Delete a department (admin-only). Blocked while any ticket still
    /// references it.
    pub async fn delete_department(&self, actor: &Actor, id: DbId) -> Result<(), CoreError> {
        policy::authorize_department(actor, Action::Delete)?;

        let department = self
            .store()
            .get_department(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Department",
                id,
            })?;

        let ticket_count = self.store().count_tickets_in_department(id).await?;
        if ticket_count > 0 {
            return Err(CoreError::Dependency(format!(
                "Department '{}' still has {ticket_count} ticket(s)",
                department.name
            )));
        }

        if !self.store().delete_department(id).await? {
            return Err(CoreError::NotFound {
                entity: "Department",
                id,
            });
        }

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::DEPARTMENT_DELETED.to_string(),
            description: format!("Department '{}' deleted", department.name),
            target_type: target_types::DEPARTMENT.to_string(),
            target_id: id,
            old_value: audit::serialize_value(&Value::Object(department.snapshot())),
            new_value: None,
            integrity_hash: None,
        }])
        .await;

        Ok(())
    }
}
