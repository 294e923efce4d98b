//! Support service: tickets, replies and the staff inbox.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use nightline_common::{AppError, AppResult, IdGenerator};
use nightline_db::{
    entities::{
        support_message::{self, MessageKind},
        support_ticket::{self, TicketStatus},
        user::{self, UserRole},
    },
    repositories::{SupportRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::permission::{Actor, Capability};

/// Subject of every promoter application ticket.
pub const PROMOTER_APPLICATION_SUBJECT: &str = "Promoter Application";

/// Support service for business logic.
#[derive(Clone)]
pub struct SupportService {
    support_repo: SupportRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for opening a ticket.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketInput {
    #[validate(length(max = 256))]
    pub subject: String,

    #[validate(length(max = 10000))]
    pub message: String,
}

/// Input for a promoter application.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PromoterApplicationInput {
    #[validate(length(max = 256))]
    pub name: String,

    #[validate(length(max = 256))]
    pub instagram: String,

    #[validate(length(max = 64))]
    pub expected_attendees: String,

    #[validate(length(max = 5000))]
    pub experience: String,

    #[validate(length(max = 5000))]
    pub message: String,
}

/// Status and handler of a ticket, the part replies and status updates change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketState {
    pub status: TicketStatus,
    pub handled_by_admin_id: Option<String>,
}

impl TicketState {
    /// A reply from the sender re-opens the ticket. The handler is kept.
    #[must_use]
    pub fn after_sender_reply(self) -> Self {
        Self {
            status: TicketStatus::Open,
            handled_by_admin_id: self.handled_by_admin_id,
        }
    }

    /// A staff reply puts the ticket in progress under that staff member.
    #[must_use]
    pub fn after_admin_reply(self, admin_id: &str) -> Self {
        Self {
            status: TicketStatus::InProgress,
            handled_by_admin_id: Some(admin_id.to_string()),
        }
    }

    /// An explicit status change. Leaving `open` stamps the handler; returning
    /// to `open` clears it.
    #[must_use]
    pub fn with_status(self, status: TicketStatus, admin_id: &str) -> Self {
        Self {
            status,
            handled_by_admin_id: (status != TicketStatus::Open).then(|| admin_id.to_string()),
        }
    }
}

impl From<&support_ticket::Model> for TicketState {
    fn from(ticket: &support_ticket::Model) -> Self {
        Self {
            status: ticket.status,
            handled_by_admin_id: ticket.handled_by_admin_id.clone(),
        }
    }
}

/// A ticket with the usernames of its sender and handler.
#[derive(Debug, Clone)]
pub struct TicketSummary {
    pub ticket: support_ticket::Model,
    pub sender_username: Option<String>,
    pub sender_role: Option<UserRole>,
    pub handler_username: Option<String>,
}

/// A ticket with its full conversation.
#[derive(Debug, Clone)]
pub struct TicketThread {
    pub summary: TicketSummary,
    pub messages: Vec<support_message::Model>,
    /// The conversation as one text, reply markers included.
    pub transcript: String,
}

/// Render a conversation as a single text with reply markers.
#[must_use]
pub fn render_transcript(messages: &[support_message::Model]) -> String {
    let mut transcript = String::new();

    for message in messages {
        match message.kind {
            MessageKind::Original => {}
            MessageKind::UserReply => transcript.push_str("\n\n--- User Reply ---\n"),
            MessageKind::AdminReply => transcript.push_str("\n\n--- Admin Reply ---\n"),
        }
        transcript.push_str(&message.body);
    }

    transcript
}

/// Body of a promoter application ticket.
#[must_use]
pub fn promoter_application_body(
    input: &PromoterApplicationInput,
    applicant: &user::Model,
    applied_at: DateTime<Utc>,
) -> String {
    let not_provided = "Not provided";

    [
        "Promoter Application Details:".to_string(),
        String::new(),
        format!("Name: {}", input.name.trim()),
        format!("Instagram: {}", input.instagram.trim()),
        format!("Expected Attendees per Event: {}", input.expected_attendees.trim()),
        format!("Experience: {}", input.experience.trim()),
        format!("Message: {}", input.message.trim()),
        String::new(),
        format!("Applicant Username: {}", applicant.username),
        format!(
            "Applicant Email: {}",
            applicant.email.as_deref().unwrap_or(not_provided)
        ),
        format!(
            "Applicant Phone: {}",
            applicant.phone.as_deref().unwrap_or(not_provided)
        ),
        format!("Application Date: {}", applied_at.to_rfc3339()),
    ]
    .join("\n")
}

fn required_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

impl SupportService {
    /// Create a new support service.
    #[must_use]
    pub const fn new(support_repo: SupportRepository, user_repo: UserRepository) -> Self {
        Self {
            support_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a ticket.
    pub async fn create_ticket(
        &self,
        actor: &Actor,
        input: CreateTicketInput,
    ) -> AppResult<support_ticket::Model> {
        actor.require(Capability::SubmitSupportTickets)?;
        input.validate()?;

        let subject = required_text(&input.subject, "Subject")?;
        let body = required_text(&input.message, "Message")?;

        self.open_ticket(actor, subject, body).await
    }

    /// File a promoter application as a ticket.
    pub async fn apply_for_promoter(
        &self,
        actor: &Actor,
        input: PromoterApplicationInput,
    ) -> AppResult<support_ticket::Model> {
        actor.require(Capability::ApplyForPromoter)?;
        input.validate()?;
        required_text(&input.name, "Name")?;
        required_text(&input.instagram, "Instagram")?;
        required_text(&input.expected_attendees, "Expected attendees")?;
        required_text(&input.experience, "Experience")?;
        required_text(&input.message, "Message")?;

        let applicant = self.user_repo.get_by_id(&actor.id).await?;
        let body = promoter_application_body(&input, &applicant, Utc::now());

        let ticket = self
            .open_ticket(actor, PROMOTER_APPLICATION_SUBJECT.to_string(), body)
            .await?;
        tracing::info!(ticket_id = %ticket.id, user_id = %actor.id, "Promoter application filed");
        Ok(ticket)
    }

    /// Reply to one's own ticket. Re-opens it.
    pub async fn sender_reply(
        &self,
        actor: &Actor,
        ticket_id: &str,
        body: &str,
    ) -> AppResult<support_ticket::Model> {
        let body = required_text(body, "Reply")?;
        let ticket = self.support_repo.get_ticket_by_id(ticket_id).await?;

        if ticket.sender_user_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only reply to your own tickets".to_string(),
            ));
        }

        let next = TicketState::from(&ticket).after_sender_reply();
        self.append(actor, ticket, MessageKind::UserReply, body, next)
            .await
    }

    /// Staff reply. Puts the ticket in progress under the replying staff member.
    pub async fn admin_reply(
        &self,
        actor: &Actor,
        ticket_id: &str,
        body: &str,
    ) -> AppResult<support_ticket::Model> {
        actor.require(Capability::ViewSupportInbox)?;
        let body = required_text(body, "Reply")?;
        let ticket = self.support_repo.get_ticket_by_id(ticket_id).await?;

        let next = TicketState::from(&ticket).after_admin_reply(&actor.id);
        self.append(actor, ticket, MessageKind::AdminReply, body, next)
            .await
    }

    /// Staff status change. Any status may follow any other.
    pub async fn set_status(
        &self,
        actor: &Actor,
        ticket_id: &str,
        status: TicketStatus,
    ) -> AppResult<support_ticket::Model> {
        actor.require(Capability::ViewSupportInbox)?;
        let ticket = self.support_repo.get_ticket_by_id(ticket_id).await?;

        let previous = ticket.status;
        let next = TicketState::from(&ticket).with_status(status, &actor.id);

        let mut active: support_ticket::ActiveModel = ticket.into();
        active.status = Set(next.status);
        active.handled_by_admin_id = Set(next.handled_by_admin_id);
        active.updated_at = Set(Some(Utc::now().into()));

        let ticket = self.support_repo.update_ticket(active).await?;
        tracing::info!(
            ticket_id = %ticket.id,
            actor_id = %actor.id,
            from = ?previous,
            to = ?ticket.status,
            "Ticket status changed"
        );
        Ok(ticket)
    }

    /// One's own tickets, newest first.
    pub async fn list_mine(
        &self,
        actor: &Actor,
        status: Option<TicketStatus>,
    ) -> AppResult<Vec<TicketSummary>> {
        actor.require(Capability::SubmitSupportTickets)?;
        let tickets = self
            .support_repo
            .find_tickets_by_sender(&actor.id, status)
            .await?;
        self.summarize(tickets).await
    }

    /// Every ticket for the staff inbox, newest first.
    pub async fn inbox(
        &self,
        actor: &Actor,
        status: Option<TicketStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<TicketSummary>> {
        actor.require(Capability::ViewSupportInbox)?;
        let tickets = self.support_repo.find_tickets(status, limit, offset).await?;
        self.summarize(tickets).await
    }

    /// A ticket with its conversation. Visible to its sender and to staff.
    pub async fn show(&self, actor: &Actor, ticket_id: &str) -> AppResult<TicketThread> {
        let ticket = self.support_repo.get_ticket_by_id(ticket_id).await?;

        if ticket.sender_user_id != actor.id && !actor.can(Capability::ViewSupportInbox) {
            // Do not reveal that the ticket exists.
            return Err(AppError::TicketNotFound(ticket_id.to_string()));
        }

        let messages = self.support_repo.find_messages(&ticket.id).await?;
        let transcript = render_transcript(&messages);
        let summary = self
            .summarize(vec![ticket])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("ticket lost while attaching users".to_string()))?;

        Ok(TicketThread {
            summary,
            messages,
            transcript,
        })
    }

    async fn open_ticket(
        &self,
        actor: &Actor,
        subject: String,
        body: String,
    ) -> AppResult<support_ticket::Model> {
        let now = Utc::now();
        let ticket_id = self.id_gen.generate();

        let ticket = support_ticket::ActiveModel {
            id: Set(ticket_id.clone()),
            sender_user_id: Set(actor.id.clone()),
            subject: Set(subject),
            status: Set(TicketStatus::Open),
            handled_by_admin_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let message = support_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            ticket_id: Set(ticket_id),
            author_user_id: Set(actor.id.clone()),
            kind: Set(MessageKind::Original),
            body: Set(body),
            created_at: Set(now.into()),
        };

        let (ticket, _) = self.support_repo.create_ticket(ticket, message).await?;
        tracing::info!(ticket_id = %ticket.id, user_id = %actor.id, "Support ticket opened");
        Ok(ticket)
    }

    async fn append(
        &self,
        actor: &Actor,
        ticket: support_ticket::Model,
        kind: MessageKind,
        body: String,
        next: TicketState,
    ) -> AppResult<support_ticket::Model> {
        let now = Utc::now();

        let message = support_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            ticket_id: Set(ticket.id.clone()),
            author_user_id: Set(actor.id.clone()),
            kind: Set(kind),
            body: Set(body),
            created_at: Set(now.into()),
        };

        let mut active: support_ticket::ActiveModel = ticket.into();
        active.status = Set(next.status);
        active.handled_by_admin_id = Set(next.handled_by_admin_id);
        active.updated_at = Set(Some(now.into()));

        let (ticket, _) = self.support_repo.append_message(message, active).await?;
        tracing::debug!(ticket_id = %ticket.id, actor_id = %actor.id, ?kind, "Ticket reply added");
        Ok(ticket)
    }

    async fn summarize(
        &self,
        tickets: Vec<support_ticket::Model>,
    ) -> AppResult<Vec<TicketSummary>> {
        let mut ids: Vec<String> = tickets
            .iter()
            .flat_map(|t| {
                std::iter::once(t.sender_user_id.clone()).chain(t.handled_by_admin_id.clone())
            })
            .collect();
        ids.sort();
        ids.dedup();

        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(tickets
            .into_iter()
            .map(|ticket| {
                let sender = users.get(&ticket.sender_user_id);
                TicketSummary {
                    sender_username: sender.map(|u| u.username.clone()),
                    sender_role: sender.map(|u| u.role),
                    handler_username: ticket
                        .handled_by_admin_id
                        .as_ref()
                        .and_then(|id| users.get(id))
                        .map(|u| u.username.clone()),
                    ticket,
                }
            })
            .collect())
    }
}
