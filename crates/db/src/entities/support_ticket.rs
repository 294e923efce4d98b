//! Support ticket entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a support ticket.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Waiting for staff.
    #[default]
    #[sea_orm(string_value = "open")]
    Open,
    /// A staff member is handling it.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Closed by staff.
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl TicketStatus {
    /// All statuses.
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Resolved];
}

/// A support ticket. The conversation lives in `support_message`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_ticket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub sender_user_id: String,

    pub subject: String,

    pub status: TicketStatus,

    /// Staff member who last acted on the ticket.
    #[sea_orm(indexed, nullable)]
    pub handled_by_admin_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::HandledByAdminId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    HandledBy,
    #[sea_orm(has_many = "super::support_message::Entity")]
    Messages,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl Related<super::support_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
