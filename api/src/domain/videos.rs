//! Video domain - DB queries for videos
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use sqlx::{Executor, PgPool, Postgres};

use crate::models::{NewVideo, VideoRow};
use crate::pagination::{self, Pagination};

/// Sort order for video listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOrder {
    /// Most recent performance first (list view)
    EventDate,
    /// Most recently saved first (home view)
    Recent,
}

impl VideoOrder {
    fn order_clause(&self) -> &'static str {
        match self {
            VideoOrder::EventDate => "v.event_date DESC NULLS LAST, v.created_at DESC, v.id DESC",
            VideoOrder::Recent => "v.created_at DESC, v.id DESC",
        }
    }
}

/// Free-text filter over artist name, song name and venue.
///
/// Matching is a case-insensitive substring test; LIKE wildcards typed by
/// the user match literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSearch {
    term: Option<String>,
}

impl VideoSearch {
    /// A blank or whitespace-only query disables filtering
    pub fn from_query(query: Option<&str>) -> Self {
        Self {
            term: query
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }

    pub fn term(&self) -> &str {
        self.term.as_deref().unwrap_or("")
    }

    /// ILIKE pattern, or None when unfiltered
    fn pattern(&self) -> Option<String> {
        self.term.as_deref().map(super::like_pattern)
    }
}

const SEARCH_WHERE: &str = r#"
    WHERE $1::text IS NULL
       OR a.name ILIKE $1
       OR v.song_name ILIKE $1
       OR v.venue ILIKE $1
"#;

const VIDEO_COLUMNS: &str = r#"
    v.id, v.video_url, v.x_account_id, v.artist_id, a.name AS artist_name,
    v.venue, v.event_date, v.song_name, v.created_at
"#;

/// Count videos matching the search
pub async fn count_videos<'e, E>(executor: E, search: &VideoSearch) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        "SELECT COUNT(*) FROM videos v LEFT JOIN artists a ON v.artist_id = a.id {}",
        SEARCH_WHERE
    );

    let (count,): (i64,) = sqlx::query_as(&query)
        .bind(search.pattern())
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// List one slice of videos matching the search
pub async fn list_videos<'e, E>(
    executor: E,
    search: &VideoSearch,
    order: VideoOrder,
    limit: i64,
    offset: i64,
) -> Result<Vec<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        SELECT {}
        FROM videos v
        LEFT JOIN artists a ON v.artist_id = a.id
        {}
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        VIDEO_COLUMNS,
        SEARCH_WHERE,
        order.order_clause()
    );

    sqlx::query_as(&query)
        .bind(search.pattern())
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

/// A resolved page of videos
#[derive(Debug, Clone)]
pub struct VideoPage {
    pub videos: Vec<VideoRow>,
    pub pagination: Pagination,
}

/// Fetch the page named by a raw `page` parameter.
///
/// The slice and the total count are fetched concurrently. If the requested
/// page lies beyond the last one, the page is clamped and the slice fetched
/// again for the clamped page.
pub async fn list_videos_page(
    db: &PgPool,
    search: &VideoSearch,
    order: VideoOrder,
    raw_page: Option<&str>,
    per_page: i64,
) -> Result<VideoPage, sqlx::Error> {
    let requested = pagination::parse_page(raw_page);

    let (mut videos, total_count) = tokio::try_join!(
        list_videos(
            db,
            search,
            order,
            per_page,
            pagination::offset_for(requested, per_page)
        ),
        count_videos(db, search),
    )?;

    let total_pages = pagination::total_pages(total_count, per_page);
    let current_page = pagination::clamp_page(requested, total_pages);

    if current_page != requested {
        videos = list_videos(
            db,
            search,
            order,
            per_page,
            pagination::offset_for(current_page, per_page),
        )
        .await?;
    }

    Ok(VideoPage {
        videos,
        pagination: Pagination::new(total_count, current_page, per_page),
    })
}

/// Get a single video with its artist name
pub async fn get_video_by_id<'e, E>(executor: E, id: i64) -> Result<Option<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        SELECT {}
        FROM videos v
        LEFT JOIN artists a ON v.artist_id = a.id
        WHERE v.id = $1
        "#,
        VIDEO_COLUMNS
    );

    sqlx::query_as(&query).bind(id).fetch_optional(executor).await
}

/// Insert a video, returning its id
pub async fn insert_video<'e, E>(executor: E, video: &NewVideo) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO videos (video_url, x_account_id, artist_id, venue, event_date, song_name)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&video.video_url)
    .bind(&video.x_account_id)
    .bind(video.artist_id)
    .bind(&video.venue)
    .bind(video.event_date)
    .bind(&video.song_name)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// Update every mutable field of a video.
/// Returns false if no video has this id.
pub async fn update_video<'e, E>(
    executor: E,
    id: i64,
    video: &NewVideo,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE videos
        SET video_url = $1, x_account_id = $2, artist_id = $3,
            venue = $4, event_date = $5, song_name = $6
        WHERE id = $7
        "#,
    )
    .bind(&video.video_url)
    .bind(&video.x_account_id)
    .bind(video.artist_id)
    .bind(&video.venue)
    .bind(video.event_date)
    .bind(&video.song_name)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a video. Returns false if no video has this id.
pub async fn delete_video<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
