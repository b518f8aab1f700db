//! Handlers for the `/notifications` resource.
//!
//! Notifications are only visible to, and mutable by, their recipient.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::repositories::NotificationRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for listing notifications.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /notifications?unread_only=&limit=&offset=
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(50).min(200);
    let offset = params.offset.unwrap_or(0);

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.unread_only.unwrap_or(false),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: json!({ "count": count }),
    }))
}

/// PATCH /notifications/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let updated = NotificationRepo::mark_read(&state.pool, id, auth.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    Ok(Json(DataResponse {
        data: json!({ "read": true }),
    }))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: json!({ "marked_read": count }),
    }))
}
