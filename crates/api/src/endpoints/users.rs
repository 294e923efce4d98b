//! Profile endpoints.

use axum::{Json, Router, extract::State, routing::put};
use chrono::{DateTime, FixedOffset};
use nightline_common::AppResult;
use nightline_core::UpdateProfileInput;
use nightline_db::entities::user::{self, UserRole};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response. Never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub badge: Option<&'static str>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            badge: user.role.badge(),
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Update the caller's contact details.
async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_profile(&auth.actor(), req)
        .await?;

    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", put(update_profile))
}
