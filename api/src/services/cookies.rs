//! Cookie building utilities for session management
//!
//! Centralizes cookie formatting to avoid duplication and ensure consistency
//! across login, session refresh, logout and the add-video draft.

use axum::http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE};

/// Cookie configuration constants
pub mod config {
    /// Access token cookie name
    pub const ACCESS_TOKEN_NAME: &str = "session_token";
    /// Refresh token cookie name
    pub const REFRESH_TOKEN_NAME: &str = "session_refresh_token";
    /// Add-video draft cookie name
    pub const DRAFT_FORM_NAME: &str = "video_form_data";
    /// Access token max-age in seconds (7 days)
    pub const ACCESS_TOKEN_MAX_AGE_SECS: u32 = 7 * 24 * 60 * 60;
    /// Refresh token max-age in seconds (30 days)
    pub const REFRESH_TOKEN_MAX_AGE_SECS: u32 = 30 * 24 * 60 * 60;
    /// Draft form max-age in seconds (1 hour)
    pub const DRAFT_FORM_MAX_AGE_SECS: u32 = 60 * 60;
    /// Path for every cookie (all routes)
    pub const COOKIE_PATH: &str = "/";
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: u32,
    http_only: bool,
) -> Result<HeaderValue, StatusCode> {
    let http_only = if http_only { " HttpOnly;" } else { "" };
    let cookie = format!(
        "{}={};{} Secure; SameSite=Strict; Path={}; Max-Age={}",
        name,
        value,
        http_only,
        config::COOKIE_PATH,
        max_age_secs
    );
    cookie.parse().map_err(|_| {
        tracing::error!(cookie = name, "Failed to parse cookie header");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Build an access token Set-Cookie header value
pub fn build_access_cookie(token: &str) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::ACCESS_TOKEN_NAME,
        token,
        config::ACCESS_TOKEN_MAX_AGE_SECS,
        true,
    )
}

/// Build a refresh token Set-Cookie header value
pub fn build_refresh_cookie(token: &str) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::REFRESH_TOKEN_NAME,
        token,
        config::REFRESH_TOKEN_MAX_AGE_SECS,
        true,
    )
}

/// Build a draft-form Set-Cookie header value. Not HttpOnly: the form page
/// script restores fields from it too.
pub fn build_draft_cookie(encoded_draft: &str) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::DRAFT_FORM_NAME,
        encoded_draft,
        config::DRAFT_FORM_MAX_AGE_SECS,
        false,
    )
}

/// Build a Set-Cookie header to clear the access token
pub fn build_clear_access_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "session_token=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
    )
}

/// Build a Set-Cookie header to clear the refresh token
pub fn build_clear_refresh_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "session_refresh_token=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
    )
}

/// Build a Set-Cookie header to clear the draft form
pub fn build_clear_draft_cookie() -> HeaderValue {
    HeaderValue::from_static("video_form_data=; Secure; SameSite=Strict; Path=/; Max-Age=0")
}

/// Append both session cookies to a response
pub fn append_session_cookies(
    headers: &mut HeaderMap,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), StatusCode> {
    let access = build_access_cookie(access_token)?;
    let refresh = build_refresh_cookie(refresh_token)?;
    headers.append(SET_COOKIE, access);
    headers.append(SET_COOKIE, refresh);
    Ok(())
}

/// Append cookies that end the session
pub fn append_cleared_session_cookies(headers: &mut HeaderMap) {
    headers.append(SET_COOKIE, build_clear_access_cookie());
    headers.append(SET_COOKIE, build_clear_refresh_cookie());
}
