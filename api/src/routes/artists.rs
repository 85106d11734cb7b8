//! Artist registration page and the picker's search API

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::ARTIST_SUGGESTION_LIMIT;
use crate::domain::artists;
use crate::forms::{ArtistForm, Flash, FormError, redirect_error, redirect_success};
use crate::models::Artist;
use crate::picker;
use crate::services::error::{ApiError, LogErr};

const ADD_PATH: &str = "/artists/add";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(ADD_PATH, get(add_page).post(add_artist))
}

/// Routes nested under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(search))
        .route("/artists/all", get(list_all))
}

/// GET /artists/add - Form page with flash flags
async fn add_page(Query(flash): Query<Flash>) -> Json<Flash> {
    Json(flash)
}

/// POST /artists/add
async fn add_artist(State(state): State<Arc<AppState>>, Form(form): Form<ArtistForm>) -> Response {
    let artist = match form.validate() {
        Ok(artist) => artist,
        Err(e) => return redirect_error(ADD_PATH, e).into_response(),
    };

    match artists::insert_artist(&state.db, &artist).await {
        Ok(Some(id)) => {
            tracing::info!(artist_id = id, name = %artist.name, "Artist added");
            redirect_success(ADD_PATH).into_response()
        }
        Ok(None) => redirect_error(ADD_PATH, FormError::Duplicate).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Insert artist error");
            redirect_error(ADD_PATH, FormError::from_write(&e)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

/// GET /api/artists?q= - Picker suggestions; a blank query yields none
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    let Some(term) = picker::suggestion_query(query.q.as_deref()) else {
        return Ok(Json(Vec::new()));
    };

    let found = artists::search_artists(&state.db, term, ARTIST_SUGGESTION_LIMIT)
        .await
        .log_api("Search artists error")?;

    Ok(Json(found))
}

/// GET /api/artists/all - Every artist for the full-list picker, optionally
/// narrowed by `q` on name or phonetic key
async fn list_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    let all = artists::list_all_artists(&state.db)
        .await
        .log_api("List artists error")?;

    let filter = query.q.as_deref().unwrap_or_default();
    if filter.trim().is_empty() {
        return Ok(Json(all));
    }

    let matched = picker::filter_artists(&all, filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(matched))
}
