//! Route definitions for the `/shares` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::shares;
use crate::state::AppState;

/// ```text
/// PUT    /shares                        -> assign
/// GET    /shares/{entity_type}/{id}     -> list_for_entity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shares", put(shares::assign))
        .route("/shares/{entity_type}/{id}", get(shares::list_for_entity))
}
