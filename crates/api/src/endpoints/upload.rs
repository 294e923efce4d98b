//! Upload endpoint.
//!
//! File uploads are no longer accepted. Clients still calling it get a
//! `410 Gone` instead of a silent failure.

use axum::{Router, routing::post};
use nightline_common::{AppError, AppResult};

use crate::middleware::AppState;

async fn upload() -> AppResult<()> {
    Err(AppError::Gone("File uploads are no longer supported".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
