//! Event entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation status of an event.
///
/// Public visibility is governed by `is_published`, not by this status;
/// an event may be `approved` and still unpublished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being prepared by its organizer; not yet submitted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Submitted and waiting for a staff decision.
    #[sea_orm(string_value = "pending_review")]
    PendingReview,
    /// Accepted by staff.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined by staff.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Live on the public listing.
    #[sea_orm(string_value = "published")]
    Published,
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl EventStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::PendingReview,
        Self::Approved,
        Self::Rejected,
        Self::Published,
    ];

    /// Whether a promoter may (re)submit an event in this status for review.
    #[must_use]
    pub const fn is_submittable(self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Calendar date of the event.
    pub date: Date,

    /// Wall-clock start time.
    pub start_time: Time,

    #[sea_orm(nullable)]
    pub end_time: Option<Time>,

    pub venue_name: String,

    pub venue_address: String,

    #[sea_orm(indexed)]
    pub city: String,

    /// The event's primary owner.
    #[sea_orm(indexed)]
    pub organizer_user_id: String,

    /// Set iff the event was created by a promoter.
    #[sea_orm(indexed, nullable)]
    pub submitted_by_promoter_id: Option<String>,

    pub ticket_button_label: String,

    #[sea_orm(nullable)]
    pub ticket_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_published: bool,

    pub status: EventStatus,

    #[sea_orm(default_value = false)]
    pub is_featured: bool,

    /// Display order among featured events, lowest first.
    #[sea_orm(nullable)]
    pub featured_rank: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmittedByPromoterId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    SubmittedBy,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
