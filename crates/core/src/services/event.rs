//! Event service: submission, moderation and public listing.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use nightline_common::{AppError, AppResult, IdGenerator, config::EventsConfig};
use nightline_db::{
    entities::{
        event::{self, EventStatus},
        user::UserRole,
    },
    repositories::{EventFilter, EventRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::permission::{Actor, Capability, can_edit_event, permits};

/// Placeholder values of a promoter's quick draft.
const DRAFT_NAME: &str = "Untitled Event";
const DRAFT_VENUE_NAME: &str = "Venue";
const DRAFT_VENUE_ADDRESS: &str = "Address";
const DRAFT_CITY: &str = "City";

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
    featured_limit: u64,
    default_ticket_button_label: String,
}

/// Descriptive fields of an event as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDetailsInput {
    #[validate(length(max = 256))]
    pub name: String,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    /// `YYYY-MM-DD`.
    pub date: String,

    /// `HH:MM` or `HH:MM:SS`.
    pub start_time: String,

    pub end_time: Option<String>,

    #[validate(length(max = 256))]
    pub venue_name: String,

    #[validate(length(max = 512))]
    pub venue_address: String,

    #[validate(length(max = 128))]
    pub city: String,

    #[validate(length(max = 128))]
    pub ticket_button_label: Option<String>,

    #[validate(length(max = 1024))]
    pub ticket_url: Option<String>,
}

/// Staff write of an event: details plus moderation fields, in one update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerateEventInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: EventDetailsInput,

    pub status: EventStatus,

    pub is_published: bool,

    pub is_featured: bool,

    #[validate(range(min = 1, max = 32767))]
    pub featured_rank: Option<i32>,
}

/// Validated, normalized event details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub venue_name: String,
    pub venue_address: String,
    pub city: String,
    pub ticket_button_label: String,
    pub ticket_url: Option<String>,
}

/// An event together with the usernames of the people attached to it.
#[derive(Debug, Clone)]
pub struct EventWithUsers {
    pub event: event::Model,
    pub organizer_username: Option<String>,
    pub promoter_username: Option<String>,
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

impl EventDetailsInput {
    /// Check required fields and parse dates and times.
    ///
    /// Blank optional fields become `None`; a blank ticket label falls back to
    /// `default_label`.
    pub fn normalize(self, default_label: &str) -> AppResult<EventDetails> {
        self.validate()?;

        let required = [
            ("name", self.name.as_str()),
            ("date", self.date.as_str()),
            ("startTime", self.start_time.as_str()),
            ("venueName", self.venue_name.as_str()),
            ("venueAddress", self.venue_address.as_str()),
            ("city", self.city.as_str()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid date: {}", self.date)))?;
        let start_time = parse_time(self.start_time.trim())
            .ok_or_else(|| AppError::Validation(format!("Invalid start time: {}", self.start_time)))?;
        let end_time = match blank_to_none(self.end_time) {
            Some(value) => Some(
                parse_time(&value)
                    .ok_or_else(|| AppError::Validation(format!("Invalid end time: {value}")))?,
            ),
            None => None,
        };

        Ok(EventDetails {
            name: trimmed(&self.name),
            description: blank_to_none(self.description),
            date,
            start_time,
            end_time,
            venue_name: trimmed(&self.venue_name),
            venue_address: trimmed(&self.venue_address),
            city: trimmed(&self.city),
            ticket_button_label: blank_to_none(self.ticket_button_label)
                .unwrap_or_else(|| default_label.to_string()),
            ticket_url: blank_to_none(self.ticket_url),
        })
    }
}

impl EventDetails {
    fn apply(self, active: &mut event::ActiveModel) {
        active.name = Set(self.name);
        active.description = Set(self.description);
        active.date = Set(self.date);
        active.start_time = Set(self.start_time);
        active.end_time = Set(self.end_time);
        active.venue_name = Set(self.venue_name);
        active.venue_address = Set(self.venue_address);
        active.city = Set(self.city);
        active.ticket_button_label = Set(self.ticket_button_label);
        active.ticket_url = Set(self.ticket_url);
    }
}

/// Status and submitter recorded when `actor` creates an event.
///
/// Promoter submissions enter review; events staff create for themselves
/// start as drafts.
#[must_use]
pub fn initial_submission(actor: &Actor) -> (EventStatus, Option<String>) {
    if actor.role == UserRole::Promoter {
        (EventStatus::PendingReview, Some(actor.id.clone()))
    } else {
        (EventStatus::Draft, None)
    }
}

/// Check that `role` may move an event from `from` to `to`.
///
/// Staff may issue any transition. Promoters may only submit a draft or a
/// rejected event for review.
pub fn authorize_status_change(role: UserRole, from: EventStatus, to: EventStatus) -> AppResult<()> {
    if permits(role, Capability::ManageEvents) {
        return Ok(());
    }

    if role == UserRole::Promoter && from.is_submittable() && to == EventStatus::PendingReview {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "Role '{}' cannot move an event from {from:?} to {to:?}",
        role.as_str()
    )))
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub fn new(event_repo: EventRepository, user_repo: UserRepository, config: &EventsConfig) -> Self {
        Self {
            event_repo,
            user_repo,
            id_gen: IdGenerator::new(),
            featured_limit: config.featured_limit,
            default_ticket_button_label: config.default_ticket_button_label.clone(),
        }
    }

    /// Maximum number of featured events returned by [`Self::featured`].
    #[must_use]
    pub const fn featured_limit(&self) -> u64 {
        self.featured_limit
    }

    // ==================== Public listing ====================

    /// Featured events for the landing page, by rank, never more than the cap.
    pub async fn featured(&self) -> AppResult<Vec<event::Model>> {
        let mut events = self.event_repo.find_featured(self.featured_limit).await?;
        events.truncate(usize::try_from(self.featured_limit).unwrap_or(usize::MAX));
        Ok(events)
    }

    /// Published events, soonest first.
    pub async fn list_published(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        self.event_repo.find_published(limit, offset).await
    }

    /// A published event with its organizer's username.
    pub async fn show_public(&self, event_id: &str) -> AppResult<EventWithUsers> {
        let event = self
            .event_repo
            .find_published_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(event_id.to_string()))?;

        let mut with_users = self.attach_usernames(vec![event]).await?;
        with_users
            .pop()
            .ok_or_else(|| AppError::Internal("event lost while attaching users".to_string()))
    }

    // ==================== Submission ====================

    /// Create an event from a full form.
    pub async fn create(&self, actor: &Actor, input: EventDetailsInput) -> AppResult<event::Model> {
        actor.require(Capability::CreateEvents)?;
        let details = input.normalize(&self.default_ticket_button_label)?;
        let (status, submitted_by) = initial_submission(actor);

        let mut active = self.blank_event(actor, status, submitted_by);
        details.apply(&mut active);

        let event = self.event_repo.create(active).await?;
        tracing::info!(
            event_id = %event.id,
            actor_id = %actor.id,
            status = ?event.status,
            "Event created"
        );
        Ok(event)
    }

    /// Create a placeholder draft for the promoter dashboard.
    pub async fn create_draft(&self, actor: &Actor) -> AppResult<event::Model> {
        actor.require(Capability::TrackOwnSubmissions)?;

        let start_time = NaiveTime::from_hms_opt(20, 0, 0)
            .ok_or_else(|| AppError::Internal("invalid draft start time".to_string()))?;

        let mut active = self.blank_event(actor, EventStatus::Draft, Some(actor.id.clone()));
        EventDetails {
            name: DRAFT_NAME.to_string(),
            description: None,
            date: Utc::now().date_naive(),
            start_time,
            end_time: None,
            venue_name: DRAFT_VENUE_NAME.to_string(),
            venue_address: DRAFT_VENUE_ADDRESS.to_string(),
            city: DRAFT_CITY.to_string(),
            ticket_button_label: self.default_ticket_button_label.clone(),
            ticket_url: None,
        }
        .apply(&mut active);

        let event = self.event_repo.create(active).await?;
        tracing::info!(event_id = %event.id, actor_id = %actor.id, "Draft event created");
        Ok(event)
    }

    /// Load an event for its edit form.
    pub async fn show_editable(&self, actor: &Actor, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if can_edit_event(actor, &event) || actor.can(Capability::ManageEvents) {
            Ok(event)
        } else {
            Err(AppError::Forbidden(
                "You are not allowed to edit this event".to_string(),
            ))
        }
    }

    /// Edit the descriptive fields of an event one is responsible for.
    pub async fn update_details(
        &self,
        actor: &Actor,
        event_id: &str,
        input: EventDetailsInput,
    ) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if !can_edit_event(actor, &event) {
            return Err(AppError::Forbidden(
                "You are not allowed to edit this event".to_string(),
            ));
        }

        let details = input.normalize(&self.default_ticket_button_label)?;
        let mut active: event::ActiveModel = event.into();
        details.apply(&mut active);
        active.updated_at = Set(Some(Utc::now().into()));

        self.event_repo.update(active).await
    }

    /// Send one's draft or rejected event (back) to review.
    pub async fn submit_for_review(&self, actor: &Actor, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if !can_edit_event(actor, &event) {
            return Err(AppError::Forbidden(
                "You are not allowed to submit this event".to_string(),
            ));
        }
        if !event.status.is_submittable() {
            return Err(AppError::BadRequest(format!(
                "An event in status {:?} cannot be submitted for review",
                event.status
            )));
        }
        authorize_status_change(actor.role, event.status, EventStatus::PendingReview)?;

        let mut active: event::ActiveModel = event.into();
        active.status = Set(EventStatus::PendingReview);
        active.updated_at = Set(Some(Utc::now().into()));

        let event = self.event_repo.update(active).await?;
        tracing::info!(event_id = %event.id, actor_id = %actor.id, "Event submitted for review");
        Ok(event)
    }

    // ==================== Moderation ====================

    /// Staff write of details, status, publication and featuring.
    ///
    /// Any status may follow any other. An event that is not featured loses
    /// its rank.
    pub async fn moderate(
        &self,
        actor: &Actor,
        event_id: &str,
        input: ModerateEventInput,
    ) -> AppResult<event::Model> {
        actor.require(Capability::ManageEvents)?;
        input.validate()?;

        let event = self.event_repo.get_by_id(event_id).await?;
        authorize_status_change(actor.role, event.status, input.status)?;

        let details = input.details.normalize(&self.default_ticket_button_label)?;
        let previous_status = event.status;

        let mut active: event::ActiveModel = event.into();
        details.apply(&mut active);
        active.status = Set(input.status);
        active.is_published = Set(input.is_published);
        active.is_featured = Set(input.is_featured);
        active.featured_rank = Set(input.featured_rank.filter(|_| input.is_featured));
        active.updated_at = Set(Some(Utc::now().into()));

        let event = self.event_repo.update(active).await?;
        tracing::info!(
            event_id = %event.id,
            actor_id = %actor.id,
            from = ?previous_status,
            to = ?event.status,
            is_published = event.is_published,
            is_featured = event.is_featured,
            "Event moderated"
        );
        Ok(event)
    }

    /// Delete an event.
    pub async fn delete(&self, actor: &Actor, event_id: &str) -> AppResult<()> {
        actor.require(Capability::ManageEvents)?;

        let event = self.event_repo.get_by_id(event_id).await?;
        self.event_repo.delete(event).await?;

        tracing::info!(event_id = %event_id, actor_id = %actor.id, "Event deleted");
        Ok(())
    }

    // ==================== Dashboards ====================

    /// A promoter's own submissions, newest first.
    pub async fn list_mine(
        &self,
        actor: &Actor,
        filter: EventFilter,
    ) -> AppResult<Vec<event::Model>> {
        actor.require(Capability::TrackOwnSubmissions)?;
        self.event_repo.find_by_submitter(&actor.id, filter).await
    }

    /// Every event for management, newest first, with usernames attached.
    pub async fn list_all(
        &self,
        actor: &Actor,
        filter: EventFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<EventWithUsers>> {
        actor.require(Capability::ManageEvents)?;
        let events = self.event_repo.find_all(filter, limit, offset).await?;
        self.attach_usernames(events).await
    }

    // ==================== Helpers ====================

    fn blank_event(
        &self,
        actor: &Actor,
        status: EventStatus,
        submitted_by: Option<String>,
    ) -> event::ActiveModel {
        event::ActiveModel {
            id: Set(self.id_gen.generate()),
            organizer_user_id: Set(actor.id.clone()),
            submitted_by_promoter_id: Set(submitted_by),
            is_published: Set(false),
            status: Set(status),
            is_featured: Set(false),
            featured_rank: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            ..Default::default()
        }
    }

    async fn attach_usernames(&self, events: Vec<event::Model>) -> AppResult<Vec<EventWithUsers>> {
        let mut ids: Vec<String> = events
            .iter()
            .flat_map(|e| {
                std::iter::once(e.organizer_user_id.clone())
                    .chain(e.submitted_by_promoter_id.clone())
            })
            .collect();
        ids.sort();
        ids.dedup();

        let usernames: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(events
            .into_iter()
            .map(|event| EventWithUsers {
                organizer_username: usernames.get(&event.organizer_user_id).cloned(),
                promoter_username: event
                    .submitted_by_promoter_id
                    .as_ref()
                    .and_then(|id| usernames.get(id).cloned()),
                event,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nightline_db::entities::user;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> EventService {
        let db = Arc::new(db);
        EventService::new(
            EventRepository::new(db.clone()),
            UserRepository::new(db),
            &EventsConfig::default(),
        )
    }

    fn details() -> EventDetailsInput {
        EventDetailsInput {
            name: "  Warehouse Night ".to_string(),
            description: Some(String::new()),
            date: "2025-06-14".to_string(),
            start_time: "22:00".to_string(),
            end_time: Some("04:30".to_string()),
            venue_name: "Dock 4".to_string(),
            venue_address: "4 Quay St".to_string(),
            city: "Leeds".to_string(),
            ticket_button_label: None,
            ticket_url: Some("  ".to_string()),
        }
    }

    fn test_event(id: &str, status: EventStatus, submitter: Option<&str>) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: "Warehouse Night".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: None,
            venue_name: "Dock 4".to_string(),
            venue_address: "4 Quay St".to_string(),
            city: "Leeds".to_string(),
            organizer_user_id: submitter.unwrap_or("a1").to_string(),
            submitted_by_promoter_id: submitter.map(str::to_string),
            ticket_button_label: "Purchase tickets".to_string(),
            ticket_url: None,
            is_published: false,
            status,
            is_featured: false,
            featured_rank: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: None,
            phone: None,
            password_hash: String::new(),
            role: UserRole::Promoter,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_normalize_details() {
        let normalized = details().normalize("Purchase tickets").unwrap();

        assert_eq!(normalized.name, "Warehouse Night");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.start_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(normalized.end_time, NaiveTime::from_hms_opt(4, 30, 0));
        assert_eq!(normalized.ticket_button_label, "Purchase tickets");
        assert_eq!(normalized.ticket_url, None);
    }

    #[test]
    fn test_normalize_reports_missing_fields() {
        let mut input = details();
        input.venue_name = " ".to_string();
        input.city = String::new();

        let err = input.normalize("Purchase tickets").unwrap_err();

        match err {
            AppError::Validation(message) => {
                assert!(message.contains("venueName"));
                assert!(message.contains("city"));
                assert!(!message.contains("date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rejects_bad_time() {
        let mut input = details();
        input.start_time = "late".to_string();

        assert!(matches!(
            input.normalize("Purchase tickets"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_promoter_submission_enters_review() {
        let promoter = Actor::new("p1", UserRole::Promoter);
        assert_eq!(
            initial_submission(&promoter),
            (EventStatus::PendingReview, Some("p1".to_string()))
        );
    }

    #[test]
    fn test_staff_creation_starts_as_draft() {
        for role in [UserRole::Admin, UserRole::Owner] {
            let actor = Actor::new("s1", role);
            assert_eq!(initial_submission(&actor), (EventStatus::Draft, None));
        }
    }

    #[test]
    fn test_staff_may_issue_any_transition() {
        for from in EventStatus::ALL {
            for to in EventStatus::ALL {
                assert!(authorize_status_change(UserRole::Admin, from, to).is_ok());
                assert!(authorize_status_change(UserRole::Owner, from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_promoter_may_only_submit() {
        use EventStatus::{Approved, Draft, PendingReview, Published, Rejected};

        assert!(authorize_status_change(UserRole::Promoter, Draft, PendingReview).is_ok());
        assert!(authorize_status_change(UserRole::Promoter, Rejected, PendingReview).is_ok());
        assert!(authorize_status_change(UserRole::Promoter, PendingReview, Approved).is_err());
        assert!(authorize_status_change(UserRole::Promoter, Approved, Published).is_err());
        assert!(authorize_status_change(UserRole::User, Draft, PendingReview).is_err());
    }

    #[test]
    fn test_blank_event_is_unpublished() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let active = svc.blank_event(
            &Actor::new("p1", UserRole::Promoter),
            EventStatus::PendingReview,
            Some("p1".to_string()),
        );

        assert_eq!(active.is_published, Set(false));
        assert_eq!(active.is_featured, Set(false));
        assert_eq!(active.featured_rank, Set(None));
        assert_eq!(active.organizer_user_id, Set("p1".to_string()));
    }

    #[tokio::test]
    async fn test_user_cannot_create_events() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc.create(&Actor::new("u1", UserRole::User), details()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_featured_never_exceeds_cap() {
        let mut featured = Vec::new();
        for rank in 1..=3 {
            let mut event = test_event(&format!("e{rank}"), EventStatus::Published, None);
            event.is_published = true;
            event.is_featured = true;
            event.featured_rank = Some(rank);
            featured.push(event);
        }

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([featured])
                .into_connection(),
        );

        let events = svc.featured().await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].featured_rank, Some(1));
    }

    #[tokio::test]
    async fn test_promoter_cannot_edit_foreign_event() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_event("e1", EventStatus::Draft, Some("p2"))]])
                .into_connection(),
        );

        let result = svc
            .update_details(&Actor::new("p1", UserRole::Promoter), "e1", details())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_submit_for_review_from_rejected() {
        let rejected = test_event("e1", EventStatus::Rejected, Some("p1"));
        let mut resubmitted = rejected.clone();
        resubmitted.status = EventStatus::PendingReview;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rejected]])
                .append_query_results([[resubmitted]])
                .into_connection(),
        );

        let event = svc
            .submit_for_review(&Actor::new("p1", UserRole::Promoter), "e1")
            .await
            .unwrap();

        assert_eq!(event.status, EventStatus::PendingReview);
    }

    #[tokio::test]
    async fn test_submit_for_review_rejects_pending() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_event("e1", EventStatus::PendingReview, Some("p1"))]])
                .into_connection(),
        );

        let result = svc
            .submit_for_review(&Actor::new("p1", UserRole::Promoter), "e1")
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_moderate_requires_staff() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc
            .moderate(
                &Actor::new("p1", UserRole::Promoter),
                "e1",
                ModerateEventInput {
                    details: details(),
                    status: EventStatus::Published,
                    is_published: true,
                    is_featured: false,
                    featured_rank: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_moderate_rejects_zero_rank() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc
            .moderate(
                &Actor::new("a1", UserRole::Admin),
                "e1",
                ModerateEventInput {
                    details: details(),
                    status: EventStatus::Published,
                    is_published: true,
                    is_featured: true,
                    featured_rank: Some(0),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_moderate_unfeature_clears_rank() {
        let mut featured = test_event("e1", EventStatus::PendingReview, Some("p1"));
        featured.is_featured = true;
        featured.featured_rank = Some(3);
        let mut approved = test_event("e1", EventStatus::Approved, Some("p1"));
        approved.is_published = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[featured]])
                .append_query_results([[approved]])
                .into_connection(),
        );
        let svc = EventService::new(
            EventRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            &EventsConfig::default(),
        );

        let event = svc
            .moderate(
                &Actor::new("a1", UserRole::Admin),
                "e1",
                ModerateEventInput {
                    details: details(),
                    status: EventStatus::Approved,
                    is_published: true,
                    is_featured: false,
                    featured_rank: Some(3),
                },
            )
            .await
            .unwrap();
        assert_eq!(event.featured_rank, None);

        drop(svc);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let update = format!("{:?}", log[1]);
        assert!(update.contains("UPDATE"));
        assert!(update.contains("\"featured_rank\" = "));
        assert!(update.contains("Int(None)"));
        assert!(update.contains("String(Some(\"approved\"))"));
        assert!(update.contains("Bool(Some(true))"));
        assert!(update.contains("Bool(Some(false))"));
    }

    #[tokio::test]
    async fn test_list_all_attaches_usernames() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_event("e1", EventStatus::PendingReview, Some("p1"))]])
                .append_query_results([[test_user("p1", "promo")]])
                .into_connection(),
        );

        let events = svc
            .list_all(&Actor::new("a1", UserRole::Admin), EventFilter::All, 50, 0)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].organizer_username.as_deref(), Some("promo"));
        assert_eq!(events[0].promoter_username.as_deref(), Some("promo"));
    }

    #[tokio::test]
    async fn test_show_public_hides_unpublished() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event::Model>::new()])
                .into_connection(),
        );

        let result = svc.show_public("draft").await;

        assert!(matches!(result, Err(AppError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_mine_is_promoter_only() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc
            .list_mine(&Actor::new("a1", UserRole::Admin), EventFilter::All)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
