//! Handlers for the `/departments` resource.
//!
//! Reads are open to any authenticated role; mutations are admin-only (the
//! pipeline enforces this too, the extractor just fails faster).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::department::{CreateDepartment, UpdateDepartment};
use helpdesk_db::repositories::DepartmentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /departments
pub async fn list_departments(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let departments = DepartmentRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: departments }))
}

/// GET /departments/{id}
pub async fn get_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Department",
            id,
        }))?;
    Ok(Json(DataResponse { data: department }))
}

/// POST /departments
pub async fn create_department(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateDepartment>,
) -> AppResult<impl IntoResponse> {
    let department = state
        .pipeline
        .create_department(&auth.actor(), &input)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        department_id = department.id,
        name = %department.name,
        "Department created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: department })))
}

/// PUT /departments/{id}
pub async fn update_department(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDepartment>,
) -> AppResult<impl IntoResponse> {
    let department = state
        .pipeline
        .update_department(&auth.actor(), id, &input)
        .await?;

    tracing::info!(user_id = auth.user_id, department_id = id, "Department updated");

    Ok(Json(DataResponse { data: department }))
}

/// DELETE /departments/{id}
pub async fn delete_department(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.pipeline.delete_department(&auth.actor(), id).await?;

    tracing::info!(user_id = auth.user_id, department_id = id, "Department deleted");

    Ok(StatusCode::NO_CONTENT)
}
