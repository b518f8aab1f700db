//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::policy::{self, Action};
use helpdesk_core::types::DbId;
use helpdesk_db::models::user::{CreateUser, UpdateUser};
use helpdesk_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /users (admin only)
pub async fn list_users(
    RequireAdmin(_auth): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /users/{id} (admin or self)
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    policy::authorize_user(&auth.actor(), id, Action::Read).map_err(AppError::Core)?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// POST /users (admin only)
pub async fn create_user(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .pipeline
        .create_user(Some(&auth.actor()), &input)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        created_user_id = user.id,
        username = %user.username,
        role = %user.role,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// PUT /users/{id}
///
/// Admins may change anything; everyone else only their own email. The
/// pipeline enforces the split.
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    let user = state.pipeline.update_user(&auth.actor(), id, &input).await?;

    tracing::info!(user_id = auth.user_id, target_user_id = id, "User updated");

    Ok(Json(DataResponse { data: user }))
}

/// DELETE /users/{id} (admin only)
pub async fn delete_user(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.pipeline.delete_user(&auth.actor(), id).await?;

    tracing::info!(user_id = auth.user_id, target_user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
