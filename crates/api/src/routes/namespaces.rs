//! Route definitions for the `/namespaces` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::namespaces;
use crate::state::AppState;

/// ```text
/// GET    /namespaces         -> list
/// POST   /namespaces         -> create
/// GET    /namespaces/{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/namespaces",
            get(namespaces::list).post(namespaces::create),
        )
        .route("/namespaces/{id}", get(namespaces::get_by_id))
}
