//! Handlers for the `/campaigns` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaigner_core::table::{TableParams, TableResponse};
use campaigner_core::types::DbId;
use campaigner_db::models::campaign::{Campaign, CampaignDetail, CreateCampaign};
use campaigner_db::repositories::CampaignRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /rest/campaigns-table
pub async fn table(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TableParams>,
) -> AppResult<Json<TableResponse>> {
    let page = CampaignRepo::list_table(&state.pool, &user.context(), &params).await?;
    Ok(Json(page))
}

/// POST /rest/campaigns
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<Campaign>)> {
    let campaign = CampaignRepo::create(&state.pool, &user.context(), &input).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /rest/campaigns/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CampaignDetail>> {
    let campaign = CampaignRepo::get_by_id(&state.pool, &user.context(), id).await?;
    Ok(Json(campaign))
}

/// DELETE /rest/campaigns/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CampaignRepo::remove(&state.pool, &user.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
