//! Repository for the `users` table.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{NewUser, User, UserWrite};

/// Column list for `users` queries.
const COLUMNS: &str =
    "id, username, email, password_hash, role, department_id, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the stored row.
    pub async fn create(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, department_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.department_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by username.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY username");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// List all users with the given role.
    pub async fn list_by_role(pool: &PgPool, role: &str) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY id");
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// List all agents belonging to a department.
    pub async fn list_agents_in_department(
        pool: &PgPool,
        department_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE role = 'agent' AND department_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(department_id)
            .fetch_all(pool)
            .await
    }

    /// Apply staged field writes in a single UPDATE.
    ///
    /// Returns the updated row, or `None` if the user does not exist. An
    /// empty write set degrades to a plain lookup.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        write: &UserWrite,
    ) -> Result<Option<User>, sqlx::Error> {
        if write.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx = 2u32; // $1 is the id
        let mut bind_values: Vec<BindValue> = Vec::new();

        if let Some(ref username) = write.username {
            sets.push(format!("username = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(username.clone()));
        }
        if let Some(ref email) = write.email {
            sets.push(format!("email = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(email.clone()));
        }
        if let Some(ref role) = write.role {
            sets.push(format!("role = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Text(role.clone()));
        }
        if let Some(department_id) = write.department_id {
            sets.push(format!("department_id = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(BindValue::NullableBigInt(department_id));
        }

        sets.push("updated_at = NOW()".to_string());

        let query = format!(
            "UPDATE users SET {} WHERE id = $1 RETURNING {COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);
        for val in &bind_values {
            match val {
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::NullableBigInt(v) => q = q.bind(*v),
            }
        }
        q.fetch_optional(pool).await
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Typed bind value for the dynamically-built UPDATE.
enum BindValue {
    Text(String),
    NullableBigInt(Option<DbId>),
}
