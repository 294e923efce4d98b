//! Event endpoints: public listing and promoter submissions.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use nightline_common::AppResult;
use nightline_core::{EventDetailsInput, EventWithUsers};
use nightline_db::{
    entities::event::{self, EventStatus},
    repositories::EventFilter,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub venue_name: String,
    pub venue_address: String,
    pub city: String,
    pub organizer_user_id: String,
    pub submitted_by_promoter_id: Option<String>,
    pub ticket_button_label: String,
    pub ticket_url: Option<String>,
    pub is_published: bool,
    pub status: EventStatus,
    pub is_featured: bool,
    pub featured_rank: Option<i32>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoter_username: Option<String>,
}

impl From<event::Model> for EventResponse {
    fn from(event: event::Model) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            venue_name: event.venue_name,
            venue_address: event.venue_address,
            city: event.city,
            organizer_user_id: event.organizer_user_id,
            submitted_by_promoter_id: event.submitted_by_promoter_id,
            ticket_button_label: event.ticket_button_label,
            ticket_url: event.ticket_url,
            is_published: event.is_published,
            status: event.status,
            is_featured: event.is_featured,
            featured_rank: event.featured_rank,
            created_at: event.created_at,
            updated_at: event.updated_at,
            organizer_username: None,
            promoter_username: None,
        }
    }
}

impl From<EventWithUsers> for EventResponse {
    fn from(with_users: EventWithUsers) -> Self {
        Self {
            organizer_username: with_users.organizer_username,
            promoter_username: with_users.promoter_username,
            ..Self::from(with_users.event)
        }
    }
}

/// Convert a list of models to responses.
pub(crate) fn to_responses<T: Into<EventResponse>>(events: Vec<T>) -> Vec<EventResponse> {
    events.into_iter().map(Into::into).collect()
}

/// Pagination request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

pub(crate) const fn default_limit() -> u64 {
    20
}

/// Cap on page sizes.
pub(crate) const MAX_LIMIT: u64 = 100;

/// Request naming a single event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIdRequest {
    pub event_id: String,
}

/// Promoter dashboard request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyEventsRequest {
    #[serde(default)]
    pub filter: EventFilter,
}

/// Edit of an event's descriptive fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub event_id: String,
    #[serde(flatten)]
    pub details: EventDetailsInput,
}

// ========== Public ==========

/// Featured events for the landing page.
async fn featured(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.featured().await?;

    Ok(ApiResponse::ok(to_responses(events)))
}

/// Published events.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list_published(req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(to_responses(events)))
}

/// A published event.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.show_public(&req.event_id).await?;

    Ok(ApiResponse::ok(event.into()))
}

// ========== Submissions ==========

/// Submit a new event.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventDetailsInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.create(&auth.actor(), req).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Create a placeholder draft.
async fn create_draft(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.create_draft(&auth.actor()).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// The caller's own submissions.
async fn mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MyEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list_mine(&auth.actor(), req.filter)
        .await?;

    Ok(ApiResponse::ok(to_responses(events)))
}

/// Load an event for editing.
async fn editable(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .show_editable(&auth.actor(), &req.event_id)
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Edit an event's descriptive fields.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .update_details(&auth.actor(), &req.event_id, req.details)
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Send a draft or rejected event to review.
async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<EventIdRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .submit_for_review(&auth.actor(), &req.event_id)
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/featured", post(featured))
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/create", post(create))
        .route("/create-draft", post(create_draft))
        .route("/mine", post(mine))
        .route("/editable", post(editable))
        .route("/update", post(update))
        .route("/submit", post(submit))
}
