//! Handler for batch permission checks.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use campaigner_db::models::share::PermissionCheckRequest;
use campaigner_db::repositories::ShareRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /rest/permissions-check
///
/// Body maps a caller-chosen name to one request; the response maps each
/// name to whether the caller holds every required operation.
pub async fn check(
    State(state): State<AppState>,
    user: AuthUser,
    Json(requests): Json<BTreeMap<String, PermissionCheckRequest>>,
) -> AppResult<Json<BTreeMap<String, bool>>> {
    let results = ShareRepo::check_permissions(&state.pool, &user.context(), &requests).await?;
    Ok(Json(results))
}
