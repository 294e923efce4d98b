//! User service: the credential store and account management.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use nightline_common::{AppError, AppResult, IdGenerator, config::BootstrapOwner};
use nightline_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::permission::{Actor, Capability, check_user_deletion, check_user_modification};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for signing up.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    /// Must equal `password` when provided.
    pub confirm_password: Option<String>,

    #[validate(length(max = 256))]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Input for updating one's own contact details.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 256))]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Input for staff edits of an account. The username is not editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(max = 256))]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    pub role: Option<UserRole>,
}

/// Treat blank contact fields as absent.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Register a new account with the `user` role.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        if input
            .confirm_password
            .as_deref()
            .is_some_and(|confirm| confirm != input.password)
        {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username),
            email: Set(blank_to_none(input.email)),
            phone: Set(blank_to_none(input.phone)),
            password_hash: Set(password_hash),
            role: Set(UserRole::User),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        // A concurrent signup can still race past the pre-check; the unique
        // index reports it as a conflict too.
        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    /// Look up a user by username and verify the password.
    ///
    /// Returns `None` for an unknown username or a wrong password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<user::Model>> {
        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Update the caller's own contact details. Blank values clear the field.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(&actor.id).await?;

        let mut active: user::ActiveModel = user.into();
        active.email = Set(blank_to_none(input.email));
        active.phone = Set(blank_to_none(input.phone));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// List accounts for user management, newest first.
    pub async fn list_users(
        &self,
        actor: &Actor,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        actor.require(Capability::ManageUsers)?;
        self.user_repo.find_all(limit, offset).await
    }

    /// Staff edit of another account's contact details and role.
    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<user::Model> {
        actor.require(Capability::ManageUsers)?;
        input.validate()?;

        let target = self.user_repo.get_by_id(user_id).await?;
        check_user_modification(actor, &target, input.role)?;

        let previous_role = target.role;
        let mut active: user::ActiveModel = target.into();
        active.email = Set(blank_to_none(input.email));
        active.phone = Set(blank_to_none(input.phone));
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;

        if updated.role != previous_role {
            tracing::info!(
                actor_id = %actor.id,
                user_id = %updated.id,
                from = previous_role.as_str(),
                to = updated.role.as_str(),
                "User role changed"
            );
        }

        Ok(updated)
    }

    /// Delete another account.
    pub async fn delete_user(&self, actor: &Actor, user_id: &str) -> AppResult<()> {
        actor.require(Capability::ManageUsers)?;

        let target = self.user_repo.get_by_id(user_id).await?;
        check_user_deletion(actor, &target)?;

        self.user_repo.delete(target).await?;
        tracing::info!(actor_id = %actor.id, user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Create the configured owner account if no account has that username yet.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_owner(&self, owner: &BootstrapOwner) -> AppResult<bool> {
        if self
            .user_repo
            .find_by_username(&owner.username)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(owner.username.clone()),
            email: Set(None),
            phone: Set(None),
            password_hash: Set(hash_password(&owner.password)?),
            role: Set(UserRole::Owner),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Bootstrap owner created");
        Ok(true)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash. An unreadable hash never matches.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
