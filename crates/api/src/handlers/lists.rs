//! Handlers for the `/lists` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaigner_core::table::{TableParams, TableResponse};
use campaigner_core::types::DbId;
use campaigner_db::models::list::{CreateList, List, ListWithHash, UpdateList};
use campaigner_db::repositories::ListRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /rest/lists-table
pub async fn table(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TableParams>,
) -> AppResult<Json<TableResponse>> {
    let page = ListRepo::list_table(&state.pool, &user.context(), &params).await?;
    Ok(Json(page))
}

/// POST /rest/lists
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateList>,
) -> AppResult<(StatusCode, Json<List>)> {
    let list = ListRepo::create(&state.pool, &user.context(), &input).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /rest/lists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ListWithHash>> {
    let list = ListRepo::get_by_id(&state.pool, &user.context(), id).await?;
    Ok(Json(list))
}

/// PUT /rest/lists/{id}
///
/// The body must carry the `originalHash` returned by the last read. The
/// response carries the new hash for the next update.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateList>,
) -> AppResult<Json<ListWithHash>> {
    let list =
        ListRepo::update_with_consistency_check(&state.pool, &user.context(), id, &input).await?;
    let hash = list.hash()?;
    Ok(Json(ListWithHash { list, hash }))
}

/// DELETE /rest/lists/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ListRepo::remove(&state.pool, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
