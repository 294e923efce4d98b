//! Role-permission model.
//!
//! Every role has an explicit capability list; [`permits`] is the single
//! lookup used by the services. Capabilities that depend on the target row
//! (editing a particular event, modifying a particular account) have their
//! own contextual checks below.

use nightline_common::{AppError, AppResult};
use nightline_db::entities::{
    event,
    user::{self, UserRole},
};
use serde::Serialize;

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// See published events.
    BrowseEvents,
    /// Create new events.
    CreateEvents,
    /// Edit the details of events one is responsible for (see [`can_edit_event`]).
    EditEvents,
    /// Moderate any event: status, publication, featuring, deletion.
    ManageEvents,
    /// List, edit and delete accounts.
    ManageUsers,
    /// Read and answer every support ticket.
    ViewSupportInbox,
    /// Grant or revoke the owner role.
    AssignOwnerRole,
    /// Edit or act on owner accounts.
    ModifyOwnerAccounts,
    /// Use the promoter dashboard of one's own submissions.
    TrackOwnSubmissions,
    /// Open support tickets and reply to one's own.
    SubmitSupportTickets,
    /// Apply to become a promoter.
    ApplyForPromoter,
}

use Capability::{
    ApplyForPromoter, AssignOwnerRole, BrowseEvents, CreateEvents, EditEvents, ManageEvents,
    ManageUsers, ModifyOwnerAccounts, SubmitSupportTickets, TrackOwnSubmissions,
    ViewSupportInbox,
};

/// The capability table.
#[must_use]
pub const fn capabilities(role: UserRole) -> &'static [Capability] {
    match role {
        UserRole::User => &[BrowseEvents, SubmitSupportTickets, ApplyForPromoter],
        UserRole::Promoter => &[
            BrowseEvents,
            CreateEvents,
            EditEvents,
            TrackOwnSubmissions,
            SubmitSupportTickets,
        ],
        UserRole::Admin => &[
            BrowseEvents,
            CreateEvents,
            EditEvents,
            ManageEvents,
            ManageUsers,
            ViewSupportInbox,
        ],
        UserRole::Owner => &[
            BrowseEvents,
            CreateEvents,
            EditEvents,
            ManageEvents,
            ManageUsers,
            ViewSupportInbox,
            AssignOwnerRole,
            ModifyOwnerAccounts,
        ],
    }
}

/// Whether `role` holds `capability`.
#[must_use]
pub fn permits(role: UserRole, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// The authenticated identity a service call acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User ID.
    pub id: String,
    /// Role at the time the request was resolved.
    pub role: UserRole,
}

impl Actor {
    /// Create an actor.
    #[must_use]
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Whether this actor holds `capability`.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        permits(self.role, capability)
    }

    /// Fail with `Forbidden` unless this actor holds `capability`.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %self.id,
                role = self.role.as_str(),
                ?capability,
                "Capability denied"
            );
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self::new(user.id.clone(), user.role)
    }
}

/// Whether `actor` may edit the descriptive fields of `event`.
///
/// Promoters may edit only their own submissions. Admins may edit events they
/// organize or submitted. Owners are unrestricted.
#[must_use]
pub fn can_edit_event(actor: &Actor, event: &event::Model) -> bool {
    if !actor.can(EditEvents) {
        return false;
    }

    let submitted_by_actor = event.submitted_by_promoter_id.as_deref() == Some(actor.id.as_str());

    match actor.role {
        UserRole::Owner => true,
        UserRole::Admin => event.organizer_user_id == actor.id || submitted_by_actor,
        UserRole::Promoter => submitted_by_actor,
        UserRole::User => false,
    }
}

/// Check that `actor` may change `target`'s account, optionally assigning `requested_role`.
pub fn check_user_modification(
    actor: &Actor,
    target: &user::Model,
    requested_role: Option<UserRole>,
) -> AppResult<()> {
    actor.require(ManageUsers)?;

    if target.role == UserRole::Owner && !actor.can(ModifyOwnerAccounts) {
        return Err(AppError::Forbidden(
            "Only owners can modify owner accounts".to_string(),
        ));
    }

    let touches_owner_role = requested_role.is_some_and(|role| role != target.role)
        && (requested_role == Some(UserRole::Owner) || target.role == UserRole::Owner);

    if touches_owner_role && !actor.can(AssignOwnerRole) {
        return Err(AppError::Forbidden(
            "Only owners can assign the owner role".to_string(),
        ));
    }

    Ok(())
}

/// Check that `actor` may delete `target`.
///
/// Owner accounts cannot be deleted through user management, and nobody can
/// delete their own account there.
pub fn check_user_deletion(actor: &Actor, target: &user::Model) -> AppResult<()> {
    actor.require(ManageUsers)?;

    if target.id == actor.id {
        return Err(AppError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }

    if target.role == UserRole::Owner {
        return Err(AppError::Forbidden(
            "Owner accounts cannot be deleted".to_string(),
        ));
    }

    Ok(())
}
