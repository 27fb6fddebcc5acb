pub mod auth;
pub mod campaigns;
pub mod health;
pub mod lists;
pub mod namespaces;
pub mod permissions;
pub mod shares;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/rest` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /login                                           login (public)
/// /users                                           create (admin only)
///
/// /lists-table                                     paged list table
/// /lists                                           create
/// /lists/{id}                                      get, update, delete
///
/// /campaigns-table                                 paged campaign table
/// /campaigns                                       create
/// /campaigns/{id}                                  get, delete
///
/// /namespaces                                      list, create
/// /namespaces/{id}                                 get
///
/// /shares                                          assign (PUT)
/// /shares/{entity_type}/{id}                       list shares
///
/// /permissions-check                               batch check (POST)
/// ```
pub fn rest_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(lists::router())
        .merge(campaigns::router())
        .merge(namespaces::router())
        .merge(shares::router())
        .merge(permissions::router())
}
