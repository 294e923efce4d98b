//! HTTP API layer for Nightline.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: auth, events, support and the staff consoles
//! - **Extractors**: authenticated user, session token
//! - **Middleware**: bearer-token session resolution
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
