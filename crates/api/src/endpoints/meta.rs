//! Meta endpoints.

use axum::{Router, extract::State, routing::post};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Instance metadata response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    pub contact_email: Option<String>,
    pub featured_limit: u64,
    pub version: String,
}

/// Get instance metadata.
async fn meta(State(state): State<AppState>) -> ApiResponse<MetaResponse> {
    ApiResponse::ok(MetaResponse {
        name: state.instance.name.clone(),
        contact_email: state.instance.contact_email.clone(),
        featured_limit: state.event_service.featured_limit(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(meta))
}
