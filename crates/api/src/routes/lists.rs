//! Route definitions for the `/lists` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lists;
use crate::state::AppState;

/// ```text
/// GET    /lists-table    -> table
/// POST   /lists          -> create
/// GET    /lists/{id}     -> get_by_id
/// PUT    /lists/{id}     -> update
/// DELETE /lists/{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lists-table", get(lists::table))
        .route("/lists", post(lists::create))
        .route(
            "/lists/{id}",
            get(lists::get_by_id)
                .put(lists::update)
                .delete(lists::delete),
        )
}
