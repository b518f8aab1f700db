//! Handlers for the `/activity` resource (admin-only audit browsing).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_db::models::activity::ActivityQuery;
use helpdesk_db::repositories::ActivityLogRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /activity?actor_id=&action_type=&target_type=&target_id=&limit=&offset=
pub async fn list_activity(
    RequireAdmin(_auth): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ActivityQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = ActivityLogRepo::query(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}
