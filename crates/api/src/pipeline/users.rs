//! User workflows.
//!
//! Creation comes in two shapes: self-registration (always a client) and
//! admin creation (any role). Updates write one composed audit entry;
//! non-admins may only change their own email.

use helpdesk_core::audit::{self, action_types, target_types};
use helpdesk_core::diff;
use helpdesk_core::error::CoreError;
use helpdesk_core::policy::{self, Action, Actor};
use helpdesk_core::roles::{self, ROLE_CLIENT};
use helpdesk_core::types::DbId;
use helpdesk_core::user as user_rules;
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::models::user::{CreateUser, NewUser, UpdateUser, User, UserWrite};
use helpdesk_db::store::EntityStore;
use serde_json::Value;

use super::MutationPipeline;
use crate::auth::password;

impl<S: EntityStore> MutationPipeline<S> {
    /// Create a user.
    ///
    /// With `actor: None` this is self-registration: the role is forced to
    /// `client` and the audit entry is attributed to the new user. With an
    /// actor, creation is admin-only and any valid role may be assigned.
    pub async fn create_user(
        &self,
        actor: Option<&Actor>,
        input: &CreateUser,
    ) -> Result<User, CoreError> {
        user_rules::validate_username(&input.username)?;
        user_rules::validate_email(&input.email)?;
        password::validate_password_strength(&input.password).map_err(CoreError::Validation)?;
        let password_hash = password::hash_password(&input.password)
            .map_err(|e| CoreError::Internal(format!("Password hashing failed: {e}")))?;

        let role = match actor {
            Some(actor) => {
                if !actor.is_admin() {
                    return Err(CoreError::Forbidden(
                        "Only admins may create users".to_string(),
                    ));
                }
                let role = input.role.clone().unwrap_or_else(|| ROLE_CLIENT.to_string());
                roles::validate_role(&role)?;
                role
            }
            None => ROLE_CLIENT.to_string(),
        };

        if let Some(department_id) = input.department_id {
            self.store()
                .get_department(department_id)
                .await?
                .ok_or_else(|| {
                    CoreError::Validation(format!("Unknown department {department_id}"))
                })?;
        }

        if self
            .store()
            .find_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }
        if self
            .store()
            .find_user_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let created = self
            .store()
            .insert_user(&NewUser {
                username: input.username.clone(),
                email: input.email.clone(),
                password_hash,
                role,
                department_id: input.department_id,
            })
            .await?;

        // Self-registration is attributed to the user themself.
        let (actor_id, actor_username, actor_role) = match actor {
            Some(actor) => (actor.id, actor.username.clone(), actor.role.clone()),
            None => (created.id, created.username.clone(), created.role.clone()),
        };
        self.record_activity(vec![NewActivityEntry {
            actor_id,
            actor_username,
            actor_role,
            action_type: action_types::USER_CREATED.to_string(),
            description: format!("User '{}' created ({})", created.username, created.role),
            target_type: target_types::USER.to_string(),
            target_id: created.id,
            old_value: None,
            new_value: serialize_user_snapshot(&created),
            integrity_hash: None,
        }])
        .await;

        Ok(created)
    }

    /// Update a user. Admins may change anything; everyone else only their
    /// own email. Writes one composed audit entry.
    pub async fn update_user(
        &self,
        actor: &Actor,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<User, CoreError> {
        policy::authorize_user(actor, id, Action::Update)?;
        if !actor.is_admin()
            && (input.username.is_some() || input.role.is_some() || input.department_id.is_some())
        {
            return Err(CoreError::Forbidden(
                "Only admins may change username, role, or department".to_string(),
            ));
        }

        if let Some(ref username) = input.username {
            user_rules::validate_username(username)?;
        }
        if let Some(ref email) = input.email {
            user_rules::validate_email(email)?;
        }
        if let Some(ref role) = input.role {
            roles::validate_role(role)?;
        }
        if let Some(Some(department_id)) = input.department_id {
            self.store()
                .get_department(department_id)
                .await?
                .ok_or_else(|| {
                    CoreError::Validation(format!("Unknown department {department_id}"))
                })?;
        }

        let current = self
            .store()
            .get_user(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "User", id })?;

        let changes =
            diff::diff_snapshots(&current.snapshot(), &input.snapshot(), diff::USER_FIELDS);
        if changes.is_empty() {
            return Ok(current);
        }

        if let Some(ref username) = input.username {
            if let Some(existing) = self.store().find_user_by_username(username).await? {
                if existing.id != id {
                    return Err(CoreError::Conflict(format!(
                        "Username '{username}' is already taken"
                    )));
                }
            }
        }
        if let Some(ref email) = input.email {
            if let Some(existing) = self.store().find_user_by_email(email).await? {
                if existing.id != id {
                    return Err(CoreError::Conflict(format!(
                        "Email '{email}' is already registered"
                    )));
                }
            }
        }

        let mut write = UserWrite::default();
        for change in &changes {
            match change.field.as_str() {
                "username" => write.username = input.username.clone(),
                "email" => write.email = input.email.clone(),
                "role" => write.role = input.role.clone(),
                "department_id" => write.department_id = input.department_id,
                _ => {}
            }
        }

        let updated = self
            .store()
            .update_user(id, &write)
            .await?
            .ok_or(CoreError::NotFound { entity: "User", id })?;

        let summary: Vec<String> = changes.iter().map(|c| c.describe()).collect();
        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::USER_UPDATED.to_string(),
            description: format!("User '{}': {}", updated.username, summary.join("; ")),
            target_type: target_types::USER.to_string(),
            target_id: id,
            old_value: serialize_user_snapshot(&current),
            new_value: serialize_user_snapshot(&updated),
            integrity_hash: None,
        }])
        .await;

        Ok(updated)
    }

    /// Delete a user (admin-only). Tickets referencing the user keep their
    /// dangling ids; the user's notifications cascade at the store level.
    pub async fn delete_user(&self, actor: &Actor, id: DbId) -> Result<(), CoreError> {
        policy::authorize_user(actor, id, Action::Delete)?;

        let user = self
            .store()
            .get_user(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "User", id })?;

        if !self.store().delete_user(id).await? {
            return Err(CoreError::NotFound { entity: "User", id });
        }

        self.record_activity(vec![NewActivityEntry {
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            actor_role: actor.role.clone(),
            action_type: action_types::USER_DELETED.to_string(),
            description: format!("User '{}' deleted", user.username),
            target_type: target_types::USER.to_string(),
            target_id: id,
            old_value: serialize_user_snapshot(&user),
            new_value: None,
            integrity_hash: None,
        }])
        .await;

        Ok(())
    }
}

/// Serialize a user snapshot for the audit trail, with sensitive keys
/// redacted.
fn serialize_user_snapshot(user: &User) -> Option<String> {
    let snapshot = Value::Object(user.snapshot());
    audit::serialize_value(&audit::redact_sensitive_fields(&snapshot))
}
