//! Repository for the `departments` table.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::department::{CreateDepartment, Department, DepartmentWrite};

/// Column list for `departments` queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD operations for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    /// Insert a new department, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        department: &CreateDepartment,
    ) -> Result<Department, sqlx::Error> {
        let query = format!(
            "INSERT INTO departments (name, description) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(&department.name)
            .bind(&department.description)
            .fetch_one(pool)
            .await
    }

    /// Find a department by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a department by its unique name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE name = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all departments ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments ORDER BY name");
        sqlx::query_as::<_, Department>(&query)
            .fetch_all(pool)
            .await
    }

    /// Apply staged field writes in a single UPDATE.
    ///
    /// Returns the updated row, or `None` if the department does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        write: &DepartmentWrite,
    ) -> Result<Option<Department>, sqlx::Error> {
        if write.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx = 2u32; // $1 is the id
        let mut bind_values: Vec<Option<String>> = Vec::new();

        if let Some(ref name) = write.name {
            sets.push(format!("name = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(Some(name.clone()));
        }
        if let Some(ref description) = write.description {
            sets.push(format!("description = ${bind_idx}"));
            let _ = bind_idx;
            bind_values.push(description.clone());
        }

        sets.push("updated_at = NOW()".to_string());

        let query = format!(
            "UPDATE departments SET {} WHERE id = $1 RETURNING {COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, Department>(&query).bind(id);
        for val in &bind_values {
            q = q.bind(val.as_deref());
        }
        q.fetch_optional(pool).await
    }

    /// Delete a department. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
