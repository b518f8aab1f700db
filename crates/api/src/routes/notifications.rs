//! Route definitions for the `/notifications` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET   /              -> list own notifications
/// GET   /unread-count  -> unread count
/// POST  /read-all      -> mark all read
/// PATCH /{id}/read     -> mark one read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/{id}/read", patch(notifications::mark_read))
}
