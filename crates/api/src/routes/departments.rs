//! Route definitions for the `/departments` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::departments;
use crate::state::AppState;

/// Routes mounted at `/departments`.
///
/// ```text
/// GET    /     -> list (any authenticated role)
/// POST   /     -> create (admin only)
/// GET    /{id} -> get (any authenticated role)
/// PUT    /{id} -> update (admin only)
/// DELETE /{id} -> delete (admin only, blocked while tickets reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
}
