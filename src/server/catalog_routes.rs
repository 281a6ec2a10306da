//! Catalog request handlers.
//!
//! Each handler validates its path parameters, issues exactly one store
//! call, and renders the outcome.

use super::api_error::{parse_int_param, ApiError};
use super::state::{GuardedCatalogStore, ServerState};
use crate::catalog_store::{Album, Artist, EntityKind, Lookup, Song};
use axum::{
    extract::{Path, State},
    handler::Handler,
    routing::{get, MethodRouter},
    Json, Router,
};

fn found<T>(kind: EntityKind, lookup: Lookup<T>) -> Result<Json<T>, ApiError> {
    match lookup {
        Lookup::Found(entity) => Ok(Json(entity)),
        Lookup::NotFound => Err(ApiError::NotFound(kind)),
        Lookup::Failed(err) => Err(ApiError::DataAccess(err)),
    }
}

async fn list_albums(State(store): State<GuardedCatalogStore>) -> Result<Json<Vec<Album>>, ApiError> {
    Ok(Json(store.list_albums().await?))
}

async fn get_album(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> Result<Json<Album>, ApiError> {
    let id = parse_int_param("id", &id)?;
    found(EntityKind::Album, store.get_album(id).await)
}

async fn list_songs(State(store): State<GuardedCatalogStore>) -> Result<Json<Vec<Song>>, ApiError> {
    Ok(Json(store.list_songs().await?))
}

async fn get_song(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> Result<Json<Song>, ApiError> {
    let id = parse_int_param("id", &id)?;
    found(EntityKind::Song, store.get_song(id).await)
}

async fn get_songs_by_year(
    State(store): State<GuardedCatalogStore>,
    Path(year): Path<String>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let year = parse_int_param("year", &year)?;
    Ok(Json(store.get_songs_by_year(year).await?))
}

async fn list_artists(
    State(store): State<GuardedCatalogStore>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    Ok(Json(store.list_artists().await?))
}

async fn get_artist(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> Result<Json<Artist>, ApiError> {
    let id = parse_int_param("id", &id)?;
    found(EntityKind::Artist, store.get_artist(id).await)
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// GET only; any other method on a known path is treated as an unknown route.
/// HEAD needs its own endpoint, otherwise axum serves it with the GET handler.
fn get_only<H, T>(handler: H) -> MethodRouter<ServerState>
where
    H: Handler<T, ServerState>,
    T: 'static,
{
    get(handler)
        .head(route_not_found)
        .fallback(route_not_found)
}

pub fn make_catalog_routes(state: ServerState) -> Router {
    Router::new()
        .route("/albums", get_only(list_albums))
        .route("/albums/{id}", get_only(get_album))
        .route("/songs", get_only(list_songs))
        .route("/songs/{id}", get_only(get_song))
        .route("/songs/year/{year}", get_only(get_songs_by_year))
        .route("/artists", get_only(list_artists))
        .route("/artists/{id}", get_only(get_artist))
        .with_state(state)
}
