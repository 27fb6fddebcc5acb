//! Handlers for the `/namespaces` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campaigner_core::types::DbId;
use campaigner_db::models::namespace::{CreateNamespace, Namespace};
use campaigner_db::repositories::NamespaceRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /rest/namespaces
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Namespace>>> {
    let namespaces = NamespaceRepo::list(&state.pool, &user.context()).await?;
    Ok(Json(namespaces))
}

/// POST /rest/namespaces
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateNamespace>,
) -> AppResult<(StatusCode, Json<Namespace>)> {
    let namespace = NamespaceRepo::create(&state.pool, &user.context(), &input).await?;
    Ok((StatusCode::CREATED, Json(namespace)))
}

/// GET /rest/namespaces/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Namespace>> {
    let namespace = NamespaceRepo::get_by_id(&state.pool, &user.context(), id).await?;
    Ok(Json(namespace))
}
