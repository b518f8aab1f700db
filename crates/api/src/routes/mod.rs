//! Route definitions.

pub mod activity;
pub mod auth;
pub mod departments;
pub mod health;
pub mod notifications;
pub mod tickets;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/me                           current user (requires auth)
///
/// /tickets                           list, create
/// /tickets/{id}                      get, update, delete
/// /tickets/{id}/comments             list, add
/// /tickets/{id}/history              audit trail
/// /comments/{id}                     delete
///
/// /departments                       list, create (create admin only)
/// /departments/{id}                  get, update, delete (mutations admin only)
///
/// /users                             list, create (admin only)
/// /users/{id}                        get, update, delete
///
/// /notifications                     list (?unread_only, limit, offset)
/// /notifications/unread-count        unread count (GET)
/// /notifications/read-all            mark all read (POST)
/// /notifications/{id}/read           mark read (PATCH)
///
/// /activity                          audit log browsing (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/tickets", tickets::router())
        .nest("/comments", tickets::comments_router())
        .nest("/departments", departments::router())
        .nest("/users", users::router())
        .nest("/notifications", notifications::router())
        .nest("/activity", activity::router())
}
