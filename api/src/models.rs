//! Shared data models used across modules

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_ARTIST;

/// An artist record from the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
}

/// A video joined with its artist's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub video_url: String,
    pub x_account_id: String,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub venue: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub song_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VideoRow {
    /// Artist name for display; the LEFT JOIN yields NULL for a missing artist
    pub fn display_artist(&self) -> &str {
        self.artist_name.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }
}

/// Validated values for inserting or updating a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub video_url: String,
    pub x_account_id: String,
    pub artist_id: Option<i64>,
    pub venue: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub song_name: Option<String>,
}

/// Validated values for inserting an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtist {
    pub name: String,
    pub name_kana: String,
}
