pub mod artists;
pub mod auth;
pub mod health;
pub mod home;
pub mod videos;

use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::AppState;
use crate::logging;

/// Build all routes, with session middleware applied per surface
pub fn build_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let pages = Router::new()
        .merge(home::routes())
        .merge(videos::routes())
        .merge(artists::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_page_session,
        ));

    let api = Router::new()
        .merge(artists::api_routes())
        .merge(videos::api_routes())
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_session,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .merge(pages)
        .nest("/api", api)
        .merge(auth::routes())
        .merge(health::routes())
}

/// The complete application: routes, request ids and tracing
pub fn build_app(state: Arc<AppState>) -> Router {
    build_routes(state.clone())
        .layer(logging::propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(logging::request_id_layer())
        .with_state(state)
}
