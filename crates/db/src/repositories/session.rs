//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use nightline_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    prelude::DateTimeWithTimeZone,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by token digest.
    pub async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::TokenHash.eq(token_hash))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session by token digest. Returns whether a row was removed.
    pub async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        let result = Session::delete_many()
            .filter(session::Column::TokenHash.eq(token_hash))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Delete sessions that expired before `now`.
    pub async fn delete_expired(&self, now: DateTimeWithTimeZone) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_by_token_hash() {
        let now = Utc::now();
        let session = session::Model {
            id: "s1".to_string(),
            user_id: "user1".to_string(),
            token_hash: "digest".to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::hours(1)).into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session]])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        let found = repo.find_by_token_hash("digest").await.unwrap().unwrap();

        assert_eq!(found.user_id, "user1");
        assert!(!found.is_expired_at(now.into()));
    }

    #[tokio::test]
    async fn test_delete_by_token_hash_reports_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        assert!(!repo.delete_by_token_hash("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        assert_eq!(repo.delete_expired(Utc::now().into()).await.unwrap(), 3);
    }
}
