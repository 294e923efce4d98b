//! Support endpoints: tickets for users and the staff inbox.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, FixedOffset};
use nightline_common::AppResult;
use nightline_core::{CreateTicketInput, PromoterApplicationInput, TicketSummary, TicketThread};
use nightline_db::entities::{
    support_message::{self, MessageKind},
    support_ticket::{self, TicketStatus},
    user::UserRole,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    endpoints::events::{MAX_LIMIT, default_limit},
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Ticket response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub sender_user_id: String,
    pub subject: String,
    pub status: TicketStatus,
    pub handled_by_admin_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_username: Option<String>,
}

impl From<support_ticket::Model> for TicketResponse {
    fn from(ticket: support_ticket::Model) -> Self {
        Self {
            id: ticket.id,
            sender_user_id: ticket.sender_user_id,
            subject: ticket.subject,
            status: ticket.status,
            handled_by_admin_id: ticket.handled_by_admin_id,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            sender_username: None,
            sender_role: None,
            handler_username: None,
        }
    }
}

impl From<TicketSummary> for TicketResponse {
    fn from(summary: TicketSummary) -> Self {
        Self {
            sender_username: summary.sender_username,
            sender_role: summary.sender_role,
            handler_username: summary.handler_username,
            ..Self::from(summary.ticket)
        }
    }
}

/// Message response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub author_user_id: String,
    pub kind: MessageKind,
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<support_message::Model> for MessageResponse {
    fn from(message: support_message::Model) -> Self {
        Self {
            id: message.id,
            author_user_id: message.author_user_id,
            kind: message.kind,
            body: message.body,
            created_at: message.created_at,
        }
    }
}

/// A ticket with its conversation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub ticket: TicketResponse,
    pub messages: Vec<MessageResponse>,
    pub transcript: String,
}

impl From<TicketThread> for ThreadResponse {
    fn from(thread: TicketThread) -> Self {
        Self {
            ticket: thread.summary.into(),
            messages: thread.messages.into_iter().map(Into::into).collect(),
            transcript: thread.transcript,
        }
    }
}

/// Request naming a single ticket.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketIdRequest {
    pub ticket_id: String,
}

/// Reply to a ticket.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub ticket_id: String,
    #[validate(length(max = 10000))]
    pub message: String,
}

/// The caller's own tickets.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTicketsRequest {
    #[serde(default)]
    pub status: Option<TicketStatus>,
}

/// Inbox listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxRequest {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Status change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub ticket_id: String,
    pub status: TicketStatus,
}

// ========== Senders ==========

/// Open a ticket.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTicketInput>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let ticket = state
        .support_service
        .create_ticket(&auth.actor(), req)
        .await?;

    Ok(ApiResponse::ok(ticket.into()))
}

/// Apply to become a promoter.
async fn promoter_application(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PromoterApplicationInput>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let ticket = state
        .support_service
        .apply_for_promoter(&auth.actor(), req)
        .await?;

    Ok(ApiResponse::ok(ticket.into()))
}

/// The caller's tickets.
async fn mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MyTicketsRequest>,
) -> AppResult<ApiResponse<Vec<TicketResponse>>> {
    let tickets = state
        .support_service
        .list_mine(&auth.actor(), req.status)
        .await?;

    Ok(ApiResponse::ok(tickets.into_iter().map(Into::into).collect()))
}

/// A ticket with its conversation.
async fn show(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TicketIdRequest>,
) -> AppResult<ApiResponse<ThreadResponse>> {
    let thread = state
        .support_service
        .show(&auth.actor(), &req.ticket_id)
        .await?;

    Ok(ApiResponse::ok(thread.into()))
}

/// Reply to one's own ticket.
async fn reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> AppResult<ApiResponse<TicketResponse>> {
    req.validate()?;

    let ticket = state
        .support_service
        .sender_reply(&auth.actor(), &req.ticket_id, &req.message)
        .await?;

    Ok(ApiResponse::ok(ticket.into()))
}

// ========== Inbox ==========

/// Every ticket.
async fn inbox(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<InboxRequest>,
) -> AppResult<ApiResponse<Vec<TicketResponse>>> {
    let tickets = state
        .support_service
        .inbox(&auth.actor(), req.status, req.limit.min(MAX_LIMIT), req.offset)
        .await?;

    Ok(ApiResponse::ok(tickets.into_iter().map(Into::into).collect()))
}

/// Staff reply.
async fn admin_reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> AppResult<ApiResponse<TicketResponse>> {
    req.validate()?;

    let ticket = state
        .support_service
        .admin_reply(&auth.actor(), &req.ticket_id, &req.message)
        .await?;

    Ok(ApiResponse::ok(ticket.into()))
}

/// Change a ticket's status.
async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let ticket = state
        .support_service
        .set_status(&auth.actor(), &req.ticket_id, req.status)
        .await?;

    Ok(ApiResponse::ok(ticket.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/promoter-application", post(promoter_application))
        .route("/mine", post(mine))
        .route("/show", post(show))
        .route("/reply", post(reply))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/list", post(inbox))
        .route("/reply", post(admin_reply))
        .route("/update-status", post(update_status))
}
