//! Staff console endpoints: event and user management.

use axum::{Json, Router, extract::State, routing::post};
use nightline_common::AppResult;
use nightline_core::{ModerateEventInput, UpdateUserInput};
use nightline_db::repositories::EventFilter;
use serde::Deserialize;

use crate::{
    endpoints::{
        events::{EventIdRequest, EventResponse, MAX_LIMIT, default_limit, to_responses},
        support,
        users::UserResponse,
    },
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, OkResponse},
};

/// Event management listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAllEventsRequest {
    #[serde(default)]
    pub filter: EventFilter,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Staff write of an event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateEventRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub input: ModerateEventInput,
}

/// User listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Staff edit of an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub input: UpdateUserInput,
}

/// Request naming a single user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

// ========== Event Management ==========

/// Every event, with organizer and promoter usernames.
async fn list_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListAllEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list_all(&auth.actor(), req.filter, req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(to_responses(events)))
}

/// Update details, status, publication and featuring of an event.
async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ModerateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .moderate(&auth.actor(), &req.event_id, req.input)
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Delete an event.
async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    state
        .event_service
        .delete(&auth.actor(), &req.event_id)
        .await?;

    Ok(ApiResponse::ok(OkResponse::OK))
}

// ========== User Management ==========

/// Every account, newest first.
async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&auth.actor(), req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Edit an account's contact details and role.
async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_user(&auth.actor(), &req.user_id, req.input)
        .await?;

    Ok(ApiResponse::ok(user.into()))
}

/// Delete an account.
async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    state
        .user_service
        .delete_user(&auth.actor(), &req.user_id)
        .await?;

    Ok(ApiResponse::ok(OkResponse::OK))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Events
        .route("/events/list", post(list_events))
        .route("/events/update", post(update_event))
        .route("/events/delete", post(delete_event))
        // Users
        .route("/users/list", post(list_users))
        .route("/users/update", post(update_user))
        .route("/users/delete", post(delete_user))
        // Support inbox
        .nest("/support", support::admin_router())
}
