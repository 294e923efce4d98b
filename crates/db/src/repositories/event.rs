//! Event repository.

use std::sync::Arc;

use crate::entities::{
    Event,
    event::{self, EventStatus},
};
use nightline_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};

/// Listing filter used by the promoter dashboard and event management.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    /// Every event.
    #[default]
    All,
    /// Events visible to the public, whatever their status.
    Published,
    /// Events in exactly this moderation status.
    #[serde(untagged)]
    Status(EventStatus),
}

impl EventFilter {
    fn apply(self, query: Select<Event>) -> Select<Event> {
        match self {
            Self::All => query,
            Self::Published => query.filter(event::Column::IsPublished.eq(true)),
            Self::Status(status) => query.filter(event::Column::Status.eq(status)),
        }
    }
}

/// Query for the landing page: published, featured, by rank, capped at `limit`.
#[must_use]
pub fn featured_query(limit: u64) -> Select<Event> {
    Event::find()
        .filter(event::Column::IsPublished.eq(true))
        .filter(event::Column::IsFeatured.eq(true))
        .order_by_asc(event::Column::FeaturedRank)
        .order_by_asc(event::Column::Date)
        .limit(limit)
}

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID, whatever its publication state.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an event by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// Find a published event by ID.
    pub async fn find_published_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .filter(event::Column::IsPublished.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Featured events for the landing page.
    pub async fn find_featured(&self, limit: u64) -> AppResult<Vec<event::Model>> {
        featured_query(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published events, soonest first.
    pub async fn find_published(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::IsPublished.eq(true))
            .order_by_asc(event::Column::Date)
            .order_by_asc(event::Column::StartTime)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events submitted by a promoter, newest first.
    pub async fn find_by_submitter(
        &self,
        promoter_id: &str,
        filter: EventFilter,
    ) -> AppResult<Vec<event::Model>> {
        let query = Event::find().filter(event::Column::SubmittedByPromoterId.eq(promoter_id));

        filter
            .apply(query)
            .order_by_desc(event::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All events for management, newest first.
    pub async fn find_all(
        &self,
        filter: EventFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        filter
            .apply(Event::find())
            .order_by_desc(event::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new event.
    pub async fn create(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an event.
    pub async fn update(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an event.
    pub async fn delete(&self, model: event::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
