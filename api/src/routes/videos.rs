//! Video pages: list, add, edit and delete, plus the add-form draft API

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, put},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentUser;
use crate::AppState;
use crate::constants::{LIST_PAGE_LINKS, LIST_PAGE_SIZE};
use crate::domain::{artists, videos};
use crate::domain::videos::{VideoOrder, VideoSearch};
use crate::draft::DraftForm;
use crate::forms::{Flash, FormError, VideoForm, redirect_error, redirect_success};
use crate::models::{Artist, VideoRow};
use crate::pagination::{Navigation, Pagination};
use crate::services::cookies::{self, config::DRAFT_FORM_NAME};
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_page))
        .route("/videos/add", get(add_page).post(add_video))
        .route("/videos/edit/{id}", get(edit_page).post(edit_video))
        .route("/videos/delete/{id}", get(delete_page).post(delete_video))
}

/// Routes nested under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/videos/draft", put(save_draft).delete(clear_draft))
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: i64,
    pub video_url: String,
    pub x_account_id: String,
    pub artist_id: Option<i64>,
    pub artist_name: String,
    pub venue: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub song_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VideoRow> for VideoResponse {
    fn from(row: VideoRow) -> Self {
        let artist_name = row.display_artist().to_string();
        Self {
            id: row.id,
            video_url: row.video_url,
            x_account_id: row.x_account_id,
            artist_id: row.artist_id,
            artist_name,
            venue: row.venue,
            event_date: row.event_date,
            song_name: row.song_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListPage {
    user_email: String,
    search: String,
    videos: Vec<VideoResponse>,
    pagination: Pagination,
    navigation: Option<Navigation>,
    #[serde(flatten)]
    flash: Flash,
}

#[derive(Debug, Serialize)]
struct AddPage {
    #[serde(flatten)]
    flash: Flash,
    draft: Option<DraftForm>,
}

#[derive(Debug, Serialize)]
struct EditPage {
    video: VideoResponse,
    artists: Vec<Artist>,
    #[serde(flatten)]
    flash: Flash,
}

#[derive(Debug, Serialize)]
struct DeletePage {
    video: Option<VideoResponse>,
    #[serde(flatten)]
    flash: Flash,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    page: Option<String>,
    success: Option<String>,
    error: Option<String>,
}

// ============================================================================
// List
// ============================================================================

/// GET /videos - Searchable list ordered by event date
async fn list_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListPage>, StatusCode> {
    let search = VideoSearch::from_query(query.search.as_deref());

    let page = videos::list_videos_page(
        &state.db,
        &search,
        VideoOrder::EventDate,
        query.page.as_deref(),
        LIST_PAGE_SIZE,
    )
    .await
    .log_500("List videos error")?;

    let navigation = Navigation::build(
        &page.pagination,
        "/videos",
        "search",
        search.term(),
        LIST_PAGE_LINKS,
    );

    Ok(Json(ListPage {
        user_email: user.email,
        search: search.term().to_string(),
        videos: page.videos.into_iter().map(VideoResponse::from).collect(),
        pagination: page.pagination,
        navigation,
        flash: Flash {
            success: query.success,
            error: query.error,
        },
    }))
}

// ============================================================================
// Add
// ============================================================================

/// GET /videos/add - Empty form, or the saved draft if one is present
async fn add_page(Query(flash): Query<Flash>, jar: CookieJar) -> Json<AddPage> {
    let draft = jar
        .get(DRAFT_FORM_NAME)
        .and_then(|c| DraftForm::decode(c.value()))
        .filter(|d| !d.is_empty());

    Json(AddPage { flash, draft })
}

/// POST /videos/add - Create a video; the draft is dropped on success
async fn add_video(State(state): State<Arc<AppState>>, Form(form): Form<VideoForm>) -> Response {
    let video = match form.validate() {
        Ok(video) => video,
        Err(e) => return redirect_error("/videos/add", e).into_response(),
    };

    match videos::insert_video(&state.db, &video).await {
        Ok(id) => {
            tracing::info!(video_id = id, "Video added");
            let mut response = redirect_success("/videos/add").into_response();
            response.headers_mut().append(
                axum::http::header::SET_COOKIE,
                cookies::build_clear_draft_cookie(),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Insert video error");
            redirect_error("/videos/add", FormError::from_write(&e)).into_response()
        }
    }
}

// ============================================================================
// Edit
// ============================================================================

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// GET /videos/edit/{id} - Video plus every artist for the picker
async fn edit_page(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Response, StatusCode> {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(Redirect::to("/videos").into_response());
    };

    let (video, artists) = tokio::try_join!(
        videos::get_video_by_id(&state.db, id),
        artists::list_all_artists(&state.db),
    )
    .log_500("Load edit page error")?;

    let Some(video) = video else {
        return Ok(Redirect::to("/videos").into_response());
    };

    Ok(Json(EditPage {
        video: video.into(),
        artists,
        flash,
    })
    .into_response())
}

/// POST /videos/edit/{id} - Update every field of a video
async fn edit_video(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<VideoForm>,
) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return Redirect::to("/videos").into_response();
    };
    let path = format!("/videos/edit/{}", id);

    let video = match form.validate() {
        Ok(video) => video,
        Err(e) => return redirect_error(&path, e).into_response(),
    };

    match videos::update_video(&state.db, id, &video).await {
        Ok(true) => {
            tracing::info!(video_id = id, "Video updated");
            redirect_success(&path).into_response()
        }
        Ok(false) => redirect_error(&path, FormError::NotFound).into_response(),
        Err(e) => {
            tracing::error!(error = %e, video_id = id, "Update video error");
            redirect_error(&path, FormError::from_write(&e)).into_response()
        }
    }
}

// ============================================================================
// Delete
// ============================================================================

/// GET /videos/delete/{id} - Confirmation page
async fn delete_page(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Response, StatusCode> {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(Redirect::to("/videos").into_response());
    };

    let video = videos::get_video_by_id(&state.db, id)
        .await
        .log_500("Load delete page error")?;

    // A failed delete lands here with error=not_found, so a missing video
    // only redirects when there is no flag to show
    if video.is_none() && flash.error.is_none() {
        return Ok(Redirect::to("/videos").into_response());
    }

    Ok(Json(DeletePage {
        video: video.map(VideoResponse::from),
        flash,
    })
    .into_response())
}

/// POST /videos/delete/{id}
async fn delete_video(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return Redirect::to("/videos").into_response();
    };
    let path = format!("/videos/delete/{}", id);

    match videos::delete_video(&state.db, id).await {
        Ok(true) => {
            tracing::info!(video_id = id, "Video deleted");
            redirect_success("/videos").into_response()
        }
        Ok(false) => redirect_error(&path, FormError::NotFound).into_response(),
        Err(e) => {
            tracing::error!(error = %e, video_id = id, "Delete video error");
            redirect_error(&path, FormError::Database).into_response()
        }
    }
}

// ============================================================================
// Draft API
// ============================================================================

/// PUT /api/videos/draft - Persist the in-progress add form
async fn save_draft(Json(draft): Json<DraftForm>) -> Result<Response, ApiError> {
    let mut response = StatusCode::NO_CONTENT.into_response();

    let cookie = if draft.is_empty() {
        cookies::build_clear_draft_cookie()
    } else {
        let encoded = draft.encode().log_api("Encode draft error")?;
        cookies::build_draft_cookie(&encoded)?
    };

    response
        .headers_mut()
        .append(axum::http::header::SET_COOKIE, cookie);
    Ok(response)
}

/// DELETE /api/videos/draft
async fn clear_draft() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().append(
        axum::http::header::SET_COOKIE,
        cookies::build_clear_draft_cookie(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, FakeIdentity, VALID_ACCESS};
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use tower::ServiceExt;

    fn authed(method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, test_support::session_cookie(VALID_ACCESS, None))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_list_requires_session() {
        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let response = app
            .oneshot(Request::builder().uri("/videos").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_invalid_video_form_redirects_with_validation_flag() {
        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let request = authed(Method::POST, "/videos/add")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("video_url=not-a-url&x_account_id=fan&artist_id=1"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/videos/add?error=validation");
    }

    #[tokio::test]
    async fn test_invalid_edit_form_keeps_id_in_redirect() {
        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let request = authed(Method::POST, "/videos/edit/7")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("video_url=https%3A%2F%2Fx.com%2Fa&x_account_id=&artist_id=1"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(location(&response), "/videos/edit/7?error=validation");
    }

    #[tokio::test]
    async fn test_non_numeric_id_redirects_to_list() {
        for uri in ["/videos/edit/abc", "/videos/delete/abc"] {
            let app = test_support::test_app(Arc::new(FakeIdentity::new()));
            let response = app
                .oneshot(authed(Method::GET, uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/videos");
        }
    }

    #[tokio::test]
    async fn test_add_page_restores_draft() {
        let draft = DraftForm {
            video_url: "https://x.com/fan/status/42".to_string(),
            x_account_id: "fan".to_string(),
            artist: Some(Artist {
                id: 3,
                name: "Band".to_string(),
                name_kana: "band".to_string(),
            }),
            ..DraftForm::default()
        };
        let cookie = format!(
            "{}; video_form_data={}",
            test_support::session_cookie(VALID_ACCESS, None),
            draft.encode().unwrap()
        );

        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let request = Request::builder()
            .uri("/videos/add?error=validation")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation");
        assert_eq!(json["draft"]["video_url"], "https://x.com/fan/status/42");
        assert_eq!(json["draft"]["artist"]["id"], 3);
    }

    #[tokio::test]
    async fn test_add_page_ignores_garbage_draft() {
        let cookie = format!(
            "{}; video_form_data=%7Bnot-json",
            test_support::session_cookie(VALID_ACCESS, None)
        );

        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let request = Request::builder()
            .uri("/videos/add")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;

        assert!(json["draft"].is_null());
    }

    #[tokio::test]
    async fn test_save_and_clear_draft() {
        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let request = authed(Method::PUT, "/api/videos/draft")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"video_url":"https://x.com/fan/status/1","venue":"Budokan"}"#))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("video_form_data="));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("HttpOnly"));

        let response = app
            .oneshot(
                authed(Method::DELETE, "/api/videos/draft")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("video_form_data=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_deleting_missing_video_redirects_with_not_found() {
        let Some(db) = test_support::db_pool().await else {
            return;
        };
        let app = test_support::test_app_with_db(Arc::new(FakeIdentity::new()), db);

        let response = app
            .clone()
            .oneshot(
                authed(Method::POST, "/videos/delete/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/videos/delete/999?error=not_found");

        let page = app
            .oneshot(
                authed(Method::GET, "/videos/delete/999?error=not_found")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(page.status(), StatusCode::OK);
        let json = body_json(page).await;
        assert!(json["video"].is_null());
        assert_eq!(json["error"], "not_found");
    }

    #[test]
    fn test_video_response_falls_back_to_unknown_artist() {
        let row = VideoRow {
            id: 1,
            video_url: "https://x.com/fan/status/1".to_string(),
            x_account_id: "fan".to_string(),
            artist_id: None,
            artist_name: None,
            venue: None,
            event_date: None,
            song_name: None,
            created_at: Utc::now(),
        };

        assert_eq!(VideoResponse::from(row).artist_name, "unknown");
    }
}
