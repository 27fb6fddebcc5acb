//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// ```text
/// GET    /campaigns-table    -> table
/// POST   /campaigns          -> create
/// GET    /campaigns/{id}     -> get_by_id
/// DELETE /campaigns/{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns-table", get(campaigns::table))
        .route("/campaigns", post(campaigns::create))
        .route(
            "/campaigns/{id}",
            get(campaigns::get_by_id).delete(campaigns::delete),
        )
}
