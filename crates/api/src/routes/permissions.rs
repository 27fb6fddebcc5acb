//! Route definitions for permission checks.

use axum::routing::post;
use axum::Router;

use crate::handlers::permissions;
use crate::state::AppState;

/// ```text
/// POST   /permissions-check    -> check
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/permissions-check", post(permissions::check))
}
