//! Session entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A signed-in session. The bearer token itself is never stored, only its digest.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub created_at: DateTimeWithTimeZone,

    pub expires_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at <= now
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
