//! Form input validation and redirect flash flags

use axum::response::Redirect;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{MIN_EMAIL_LEN, MIN_PASSWORD_LEN};
use crate::models::{NewArtist, NewVideo};

/// Failure outcomes of a form submission, carried back as `?error=<flag>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("invalid form input")]
    Validation,
    #[error("duplicate entry")]
    Duplicate,
    #[error("database error")]
    Database,
    #[error("record not found")]
    NotFound,
    #[error("invalid credentials")]
    Credentials,
    #[error("server error")]
    Server,
}

impl FormError {
    pub fn flag(&self) -> &'static str {
        match self {
            FormError::Validation => "validation",
            FormError::Duplicate => "duplicate",
            FormError::Database => "database",
            FormError::NotFound => "not_found",
            FormError::Credentials => "credentials",
            FormError::Server => "server",
        }
    }

    /// Classify a failed write: a dangling artist reference is the user's
    /// input, anything else is the datastore.
    pub fn from_write(err: &sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_foreign_key_violation() => FormError::Validation,
            Some(db_err) if db_err.is_unique_violation() => FormError::Duplicate,
            _ => FormError::Database,
        }
    }
}

/// 303 back to `path` with `?error=<flag>`
pub fn redirect_error(path: &str, err: FormError) -> Redirect {
    Redirect::to(&format!("{}?error={}", path, err.flag()))
}

/// 303 back to `path` with `?success=1`
pub fn redirect_success(path: &str) -> Redirect {
    Redirect::to(&format!("{}?success=1", path))
}

/// `success` / `error` flags from the query string of a page load
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(value: &str) -> Result<String, FormError> {
    optional(value).ok_or(FormError::Validation)
}

/// Raw add/edit video form. Every field defaults so a missing input turns
/// into a validation flag instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoForm {
    pub video_url: String,
    pub x_account_id: String,
    pub artist_id: String,
    pub venue: String,
    pub event_date: String,
    pub song_name: String,
}

impl VideoForm {
    pub fn validate(&self) -> Result<NewVideo, FormError> {
        let video_url = required(&self.video_url)?;
        let parsed = Url::parse(&video_url).map_err(|_| FormError::Validation)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FormError::Validation);
        }

        let x_account_id = required(&self.x_account_id)?;
        let x_account_id = x_account_id.trim_start_matches('@').to_string();
        if x_account_id.is_empty() {
            return Err(FormError::Validation);
        }

        let artist_id = required(&self.artist_id)?
            .parse::<i64>()
            .map_err(|_| FormError::Validation)?;

        let event_date = optional(&self.event_date)
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| FormError::Validation)?;

        Ok(NewVideo {
            video_url,
            x_account_id,
            artist_id: Some(artist_id),
            venue: optional(&self.venue),
            event_date,
            song_name: optional(&self.song_name),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub name_kana: String,
}

impl ArtistForm {
    pub fn validate(&self) -> Result<NewArtist, FormError> {
        Ok(NewArtist {
            name: required(&self.name)?,
            name_kana: required(&self.name_kana)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let email = self.email.trim();
        if email.chars().count() < MIN_EMAIL_LEN || !email.contains('@') {
            return Err(FormError::Validation);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::Validation);
        }
        Ok(())
    }
}
