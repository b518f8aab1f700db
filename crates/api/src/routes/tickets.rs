//! Route definitions for the `/tickets` and `/comments` resources.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /              -> role-scoped list
/// POST   /              -> create
/// GET    /{id}          -> get
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// GET    /{id}/comments -> list comments
/// POST   /{id}/comments -> add comment
/// GET    /{id}/history  -> audit trail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route(
            "/{id}/comments",
            get(tickets::list_comments).post(tickets::add_comment),
        )
        .route("/{id}/history", get(tickets::ticket_history))
}

/// Routes mounted at `/comments`.
///
/// ```text
/// DELETE /{id} -> delete comment (author or admin)
/// ```
pub fn comments_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(tickets::delete_comment))
}
