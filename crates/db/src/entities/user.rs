//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an account.
///
/// Roles are totally ordered by [`UserRole::rank`]:
/// `user < promoter < admin < owner`.
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
pub enum UserRole {
    /// Regular member.
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    /// Can submit events for review.
    #[sea_orm(string_value = "promoter")]
    Promoter,
    /// Moderates events, users and support tickets.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Full control, including other owners and admins.
    #[sea_orm(string_value = "owner")]
    Owner,
}

impl UserRole {
    /// Every role, lowest rank first.
    pub const ALL: [Self; 4] = [Self::User, Self::Promoter, Self::Admin, Self::Owner];

    /// Position in the role hierarchy.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Promoter => 1,
            Self::Admin => 2,
            Self::Owner => 3,
        }
    }

    /// Whether this role is at or above `required` in the hierarchy.
    #[must_use]
    pub const fn at_least(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Display badge shown next to the username. Carries no authorization weight.
    #[must_use]
    pub const fn badge(self) -> Option<&'static str> {
        match self {
            Self::Owner => Some("owner"),
            Self::Admin => Some("admin"),
            Self::Promoter => Some("promoter"),
            Self::User => None,
        }
    }

    /// The stored string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Promoter => "promoter",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Argon2 PHC string. Never leaves the service layer.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
    #[sea_orm(has_many = "super::support_ticket::Entity")]
    SupportTickets,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::support_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportTickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
