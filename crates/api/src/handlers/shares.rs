//! Handlers for the `/shares` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campaigner_core::permissions::EntityType;
use campaigner_core::types::DbId;
use campaigner_db::models::share::{AssignShare, ShareWithUser};
use campaigner_db::repositories::ShareRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// PUT /rest/shares
///
/// A `role` of `null` revokes the share.
pub async fn assign(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<AssignShare>,
) -> AppResult<StatusCode> {
    ShareRepo::assign(&state.pool, &user.context(), &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /rest/shares/{entity_type}/{id}
pub async fn list_for_entity(
    State(state): State<AppState>,
    user: AuthUser,
    Path((entity_type, id)): Path<(String, DbId)>,
) -> AppResult<Json<Vec<ShareWithUser>>> {
    let entity_type: EntityType = entity_type.parse()?;
    let shares = ShareRepo::list_for_entity(&state.pool, &user.context(), entity_type, id).await?;
    Ok(Json(shares))
}
