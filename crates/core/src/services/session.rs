//! Session service.
//!
//! Sign-in issues an opaque bearer token; only its digest is stored.
//! Every request resolves the token back to a freshly loaded user, so role
//! changes take effect on the next request.

use chrono::{Duration, Utc};
use nightline_common::{AppError, AppResult, IdGenerator, hash_token};
use nightline_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::user::UserService;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Bearer token to present on later requests. Not recoverable afterwards.
    pub token: String,
    /// The session row.
    pub session: session::Model,
    /// The signed-in user.
    pub user: user::Model,
}

/// Session service for business logic.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    user_repo: UserRepository,
    user_service: UserService,
    id_gen: IdGenerator,
    ttl: Duration,
}

impl SessionService {
    /// Create a new session service with sessions lasting `ttl_hours`.
    #[must_use]
    pub fn new(
        session_repo: SessionRepository,
        user_repo: UserRepository,
        user_service: UserService,
        ttl_hours: i64,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            user_service,
            id_gen: IdGenerator::new(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Verify credentials and open a session.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<SignedIn> {
        let Some(user) = self.user_service.authenticate(username, password).await? else {
            tracing::debug!(username = %username, "Sign-in rejected");
            return Err(AppError::Unauthorized);
        };

        let token = self.id_gen.generate_session_token();
        let now = Utc::now();

        let session = self
            .session_repo
            .create(session::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                token_hash: Set(hash_token(&token)),
                created_at: Set(now.into()),
                expires_at: Set((now + self.ttl).into()),
            })
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "User signed in");

        Ok(SignedIn {
            token,
            session,
            user,
        })
    }

    /// Resolve a bearer token to its user.
    ///
    /// Unknown and expired tokens resolve to `None`; an expired session is
    /// removed on the way.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<user::Model>> {
        let digest = hash_token(token);

        let Some(session) = self.session_repo.find_by_token_hash(&digest).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now().into()) {
            tracing::debug!(session_id = %session.id, "Session expired");
            self.session_repo.delete_by_token_hash(&digest).await?;
            return Ok(None);
        }

        self.user_repo.find_by_id(&session.user_id).await
    }

    /// End the session identified by `token`.
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        if self
            .session_repo
            .delete_by_token_hash(&hash_token(token))
            .await?
        {
            tracing::debug!("Session ended");
        }
        Ok(())
    }

    /// Remove every expired session. Returns the number removed.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let removed = self.session_repo.delete_expired(Utc::now().into()).await?;
        if removed > 0 {
            tracing::info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}
