//! Authentication: session middleware, login and logout

use axum::{
    Form, Json, Router,
    extract::{FromRequestParts, Query, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;
use crate::forms::{FormError, LoginForm, redirect_error};
use crate::services::cookies::{self, config::ACCESS_TOKEN_NAME, config::REFRESH_TOKEN_NAME};
use crate::services::error::ApiError;
use crate::services::identity::{AuthUser, IdentityError};
use crate::services::session::{self, SessionState};

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit login attempts per client IP: burst of 10, then one every 6 seconds
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("static rate limit config is valid");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    Router::new()
        .route("/login", get(login_page).post(login))
        .layer(rate_limit_layer)
        .route("/logout", get(logout).post(logout))
}

// ============================================================================
// Session middleware - resolves the session cookies for protected routes
// ============================================================================

/// The signed-in user, placed in request extensions by the session middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Page routes: unauthenticated requests are redirected to /login
pub async fn require_page_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    with_session(&state, request, next, || Redirect::to("/login").into_response()).await
}

/// API routes: unauthenticated requests get a 401 JSON body
pub async fn require_api_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    with_session(&state, request, next, || {
        ApiError(StatusCode::UNAUTHORIZED).into_response()
    })
    .await
}

async fn with_session<F>(state: &AppState, mut request: Request, next: Next, reject: F) -> Response
where
    F: FnOnce() -> Response,
{
    let jar = CookieJar::from_headers(request.headers());
    let access_token = jar.get(ACCESS_TOKEN_NAME).map(|c| c.value().to_string());
    let refresh_token = jar.get(REFRESH_TOKEN_NAME).map(|c| c.value().to_string());

    let session = session::check_session(
        state.identity.as_ref(),
        access_token.as_deref(),
        refresh_token.as_deref(),
    )
    .await;

    let SessionState::Authenticated { user, renewed } = session else {
        return reject();
    };

    request.extensions_mut().insert(CurrentUser(user));
    let mut response = next.run(request).await;

    if let Some(tokens) = renewed {
        // The request already succeeded; only the rotated cookies are lost
        if let Err(status) = cookies::append_session_cookies(
            response.headers_mut(),
            &tokens.access_token,
            &tokens.refresh_token,
        ) {
            tracing::warn!(status = %status, "Failed to write refreshed session cookies");
        }
    }

    response
}

// ============================================================================
// Login / logout
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginPage {
    error: Option<String>,
}

/// GET /login - Login page model
async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage { error: query.error })
}

/// POST /login - Sign in with email and password, set session cookies
async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    if let Err(e) = form.validate() {
        return redirect_error("/login", e).into_response();
    }

    let session = match state
        .identity
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            let flag = login_failure(&e);
            tracing::warn!(error = %e, "Login failed");
            return redirect_error("/login", flag).into_response();
        }
    };

    let mut response = Redirect::to("/").into_response();
    if cookies::append_session_cookies(
        response.headers_mut(),
        &session.access_token,
        &session.refresh_token,
    )
    .is_err()
    {
        return redirect_error("/login", FormError::Server).into_response();
    }

    tracing::info!(user_id = %session.user.id, "User signed in");
    response
}

fn login_failure(err: &IdentityError) -> FormError {
    if err.is_rejection() {
        FormError::Credentials
    } else {
        FormError::Server
    }
}

/// GET|POST /logout - Revoke the session at the provider and clear cookies
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(access_token) = jar.get(ACCESS_TOKEN_NAME) {
        if let Err(e) = state.identity.sign_out(access_token.value()).await {
            // Log but don't fail logout - the cookies are cleared either way
            tracing::warn!(error = %e, "Failed to revoke session during logout");
        }
    }

    let mut response = Redirect::to("/login").into_response();
    cookies::append_cleared_session_cookies(response.headers_mut());
    response
}
