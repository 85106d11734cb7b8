use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::videos::VideoResponse;
use crate::AppState;
use crate::constants::{HOME_PAGE_LINKS, HOME_PAGE_SIZE};
use crate::domain::videos::{self, VideoOrder, VideoSearch};
use crate::pagination::{Navigation, Pagination};
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home_page))
}

#[derive(Debug, Deserialize)]
struct HomeQuery {
    query: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Serialize)]
struct HomePage {
    user_email: String,
    query: String,
    videos: Vec<VideoResponse>,
    pagination: Pagination,
    navigation: Option<Navigation>,
}

/// GET / - Most recently added videos, compact navigation
async fn home_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HomeQuery>,
) -> Result<Json<HomePage>, StatusCode> {
    let search = VideoSearch::from_query(query.query.as_deref());

    let page = videos::list_videos_page(
        &state.db,
        &search,
        VideoOrder::Recent,
        query.page.as_deref(),
        HOME_PAGE_SIZE,
    )
    .await
    .log_500("Home page videos error")?;

    let navigation = Navigation::build(&page.pagination, "/", "query", search.term(), HOME_PAGE_LINKS);

    Ok(Json(HomePage {
        user_email: user.email,
        query: search.term().to_string(),
        videos: page.videos.into_iter().map(VideoResponse::from).collect(),
        pagination: page.pagination,
        navigation,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{self, FakeIdentity};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_home_redirects_without_session() {
        let app = test_support::test_app(Arc::new(FakeIdentity::new()));
        let response = app
            .oneshot(Request::builder().uri("/?page=2").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}
