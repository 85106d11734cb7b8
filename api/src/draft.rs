//! Draft persistence for the add-video form.
//!
//! The in-progress form is kept as JSON in the `video_form_data` cookie so a
//! reload (or a detour to register a missing artist) does not lose it.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::models::Artist;

/// Characters allowed through unescaped in a cookie value
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftForm {
    pub video_url: String,
    pub x_account_id: String,
    pub artist: Option<Artist>,
    pub venue: String,
    pub event_date: String,
    pub song_name: String,
}

impl DraftForm {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize into a cookie-safe string
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(utf8_percent_encode(&json, COOKIE_VALUE).to_string())
    }

    /// Restore a draft from a cookie value. The value may arrive either
    /// already percent-decoded (by the cookie jar) or still encoded.
    /// Anything undecodable is dropped.
    pub fn decode(raw: &str) -> Option<Self> {
        if let Ok(draft) = serde_json::from_str(raw) {
            return Some(draft);
        }

        let json = percent_decode_str(raw).decode_utf8().ok()?;
        serde_json::from_str(&json).ok()
    }
}
