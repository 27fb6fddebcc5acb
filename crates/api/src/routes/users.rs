//! Route definitions for the `/users` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// POST /users    -> create (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users", post(users::create))
}
