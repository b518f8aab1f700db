//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /     -> list (admin only)
/// POST   /     -> create (admin only)
/// GET    /{id} -> get (admin or self)
/// PUT    /{id} -> update (admin; self for email)
/// DELETE /{id} -> delete (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
