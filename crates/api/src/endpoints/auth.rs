//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use nightline_common::AppResult;
use nightline_core::{SignedIn, SignupInput};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::users::UserResponse,
    extractors::{AuthUser, SessionToken},
    middleware::AppState,
    response::{ApiResponse, OkResponse},
};

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Session response, returned by signup and signin.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<FixedOffset>,
    pub user: UserResponse,
}

impl From<SignedIn> for SessionResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            token: signed_in.token,
            expires_at: signed_in.session.expires_at,
            user: signed_in.user.into(),
        }
    }
}

/// Create a new account and sign it in.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let password = req.password.clone();
    let user = state.user_service.signup(req).await?;

    let signed_in = state
        .session_service
        .sign_in(&user.username, &password)
        .await?;

    Ok(ApiResponse::ok(signed_in.into()))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let signed_in = state
        .session_service
        .sign_in(&req.username, &req.password)
        .await?;

    Ok(ApiResponse::ok(signed_in.into()))
}

/// End the current session.
async fn signout(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.session_service.sign_out(&token).await?;

    Ok(ApiResponse::ok(OkResponse::OK))
}

/// The current identity.
async fn i(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/i", get(i).post(i))
}
