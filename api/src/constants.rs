//! Application constants

use std::time::Duration;

/// Videos per page on the full list view (/videos)
pub const LIST_PAGE_SIZE: i64 = 20;

/// Videos per page on the home view (/)
pub const HOME_PAGE_SIZE: i64 = 12;

/// Page numbers shown in the list view navigation
pub const LIST_PAGE_LINKS: i64 = 5;

/// Page numbers shown in the compact home view navigation
pub const HOME_PAGE_LINKS: i64 = 3;

/// Maximum suggestions returned by the artist autocomplete endpoint
pub const ARTIST_SUGGESTION_LIMIT: i64 = 10;

/// Quiet period before an incremental artist search is issued
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Minimum password length accepted by the login form
pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum email length accepted by the login form
pub const MIN_EMAIL_LEN: usize = 3;

/// Artist name shown when a video has no (or a dangling) artist reference
pub const UNKNOWN_ARTIST: &str = "unknown";
