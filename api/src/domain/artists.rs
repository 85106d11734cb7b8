//! Artist domain - DB queries for artists
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use sqlx::{Executor, Postgres};

use crate::models::{Artist, NewArtist};

/// Autocomplete lookup: substring match on name or phonetic key
pub async fn search_artists<'e, E>(
    executor: E,
    query: &str,
    limit: i64,
) -> Result<Vec<Artist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, name, name_kana
        FROM artists
        WHERE name ILIKE $1 OR name_kana ILIKE $1
        ORDER BY name
        LIMIT $2
        "#,
    )
    .bind(super::like_pattern(query))
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// All artists, ordered by name
pub async fn list_all_artists<'e, E>(executor: E) -> Result<Vec<Artist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT id, name, name_kana FROM artists ORDER BY name")
        .fetch_all(executor)
        .await
}

/// Insert an artist. Returns `None` when the name is already taken; the
/// unique constraint makes the check and the insert one statement.
pub async fn insert_artist<'e, E>(
    executor: E,
    artist: &NewArtist,
) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO artists (name, name_kana)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(&artist.name)
    .bind(&artist.name_kana)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id,)| id))
}
