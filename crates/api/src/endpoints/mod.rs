//! API endpoints.

mod admin;
mod auth;
mod events;
mod meta;
mod support;
mod upload;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(upload::router())
        .nest("/meta", meta::router())
        .nest("/events", events::router())
        .nest("/support", support::router())
        .nest("/admin", admin::router())
}
