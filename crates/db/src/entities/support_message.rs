//! Support message entity.
//!
//! One row per message in a support ticket conversation, append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Who wrote a support message and in what capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The message that opened the ticket.
    #[sea_orm(string_value = "original")]
    Original,
    /// A follow-up from the ticket's sender.
    #[sea_orm(string_value = "user_reply")]
    UserReply,
    /// A reply from staff.
    #[sea_orm(string_value = "admin_reply")]
    AdminReply,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub ticket_id: String,

    pub author_user_id: String,

    pub kind: MessageKind,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::support_ticket::Entity",
        from = "Column::TicketId",
        to = "super::support_ticket::Column::Id",
        on_delete = "Cascade"
    )]
    Ticket,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::support_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
