//! Support ticket repository.
//!
//! Tickets and their messages are written together: a new message and the
//! ticket status it implies commit in one transaction.

use std::sync::Arc;

use crate::entities::{
    SupportMessage, SupportTicket, support_message,
    support_ticket::{self, TicketStatus},
};
use nightline_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

/// Support repository for database operations.
#[derive(Clone)]
pub struct SupportRepository {
    db: Arc<DatabaseConnection>,
}

impl SupportRepository {
    /// Create a new support repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a ticket by ID.
    pub async fn find_ticket_by_id(&self, id: &str) -> AppResult<Option<support_ticket::Model>> {
        SupportTicket::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a ticket by ID, returning an error if not found.
    pub async fn get_ticket_by_id(&self, id: &str) -> AppResult<support_ticket::Model> {
        self.find_ticket_by_id(id)
            .await?
            .ok_or_else(|| AppError::TicketNotFound(id.to_string()))
    }

    /// Tickets opened by a user, newest first.
    pub async fn find_tickets_by_sender(
        &self,
        sender_id: &str,
        status: Option<TicketStatus>,
    ) -> AppResult<Vec<support_ticket::Model>> {
        let mut query =
            SupportTicket::find().filter(support_ticket::Column::SenderUserId.eq(sender_id));

        if let Some(status) = status {
            query = query.filter(support_ticket::Column::Status.eq(status));
        }

        query
            .order_by_desc(support_ticket::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All tickets for the staff inbox, newest first.
    pub async fn find_tickets(
        &self,
        status: Option<TicketStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<support_ticket::Model>> {
        let mut query = SupportTicket::find();

        if let Some(status) = status {
            query = query.filter(support_ticket::Column::Status.eq(status));
        }

        query
            .order_by_desc(support_ticket::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages of a ticket, oldest first.
    pub async fn find_messages(&self, ticket_id: &str) -> AppResult<Vec<support_message::Model>> {
        SupportMessage::find()
            .filter(support_message::Column::TicketId.eq(ticket_id))
            .order_by_asc(support_message::Column::CreatedAt)
            .order_by_asc(support_message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Open a ticket with its first message.
    pub async fn create_ticket(
        &self,
        ticket: support_ticket::ActiveModel,
        message: support_message::ActiveModel,
    ) -> AppResult<(support_ticket::Model, support_message::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ticket = ticket
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let message = message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((ticket, message))
    }

    /// Append a message and apply the ticket change it implies.
    pub async fn append_message(
        &self,
        message: support_message::ActiveModel,
        ticket: support_ticket::ActiveModel,
    ) -> AppResult<(support_ticket::Model, support_message::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let message = message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let ticket = ticket
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((ticket, message))
    }

    /// Update a ticket.
    pub async fn update_ticket(
        &self,
        model: support_ticket::ActiveModel,
    ) -> AppResult<support_ticket::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
