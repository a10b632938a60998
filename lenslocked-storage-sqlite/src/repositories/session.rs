use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, Session, SessionId, User, UserId, repositories::SessionRepository,
};
use sqlx::SqlitePool;

use crate::{from_timestamp, repositories::user::SqliteUser, storage_error};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSession {
    id: String,
    user_id: String,
    token_hash: String,
    created_at: i64,
    updated_at: i64,
    expires_at: Option<i64>,
}

impl TryFrom<SqliteSession> for Session {
    type Error = Error;

    fn try_from(session: SqliteSession) -> Result<Self, Self::Error> {
        Session::builder()
            .id(SessionId::new(&session.id))
            .user_id(UserId::new(&session.user_id))
            .token_hash(session.token_hash)
            .created_at(from_timestamp(session.created_at)?)
            .updated_at(from_timestamp(session.updated_at)?)
            .expires_at(session.expires_at.map(from_timestamp).transpose()?)
            .build()
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn upsert(&self, session: &Session) -> Result<Session, Error> {
        let sqlite_session = sqlx::query_as::<_, SqliteSession>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, created_at, updated_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id) DO UPDATE SET
                token_hash = excluded.token_hash,
                updated_at = excluded.updated_at,
                expires_at = excluded.expires_at
            RETURNING id, user_id, token_hash, created_at, updated_at, expires_at
            "#,
        )
        .bind(session.id.as_str())
        .bind(session.user_id.as_str())
        .bind(&session.token_hash)
        .bind(session.created_at.timestamp())
        .bind(session.updated_at.timestamp())
        .bind(session.expires_at.map(|t| t.timestamp()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to upsert session", e))?;

        sqlite_session.try_into()
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            SELECT users.id, users.email, users.created_at, users.updated_at
            FROM sessions
            JOIN users ON users.id = sessions.user_id
            WHERE sessions.token_hash = ?1
              AND (sessions.expires_at IS NULL OR sessions.expires_at > ?2)
            "#,
        )
        .bind(token_hash)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user by session", e))?;

        sqlite_user.map(TryInto::try_into).transpose()
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, Error> {
        let sqlite_session = sqlx::query_as::<_, SqliteSession>(
            r#"
            SELECT id, user_id, token_hash, created_at, updated_at, expires_at
            FROM sessions
            WHERE token_hash = ?1 AND (expires_at IS NULL OR expires_at > ?2)
            "#,
        )
        .bind(token_hash)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find session", e))?;

        sqlite_session.map(TryInto::try_into).transpose()
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete session", e))?;

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete sessions for user", e))?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1",
        )
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to clean up expired sessions", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, setup};
    use chrono::Duration;
    use lenslocked_core::{crypto::hash_token, repositories::SessionRepositoryProvider};

    fn session_for(user: &User, token: &str, expires_at: Option<DateTime<Utc>>) -> Session {
        Session::builder()
            .user_id(user.id.clone())
            .token_hash(hash_token(token))
            .expires_at(expires_at)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_find() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "session@example.com").await;
        let repo = provider.session();

        let stored = repo.upsert(&session_for(&user, "token-1", None)).await.unwrap();
        assert_eq!(stored.user_id, user.id);

        let found = repo
            .find_user_by_token_hash(&hash_token("token-1"), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        let session = repo
            .find_by_token_hash(&hash_token("token-1"), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.id, stored.id);
    }

    #[tokio::test]
    async fn test_upsert_replaces_token_in_place() {
        let (pool, provider) = setup().await;
        let user = create_user(&provider, "rotate@example.com").await;
        let repo = provider.session();

        let first = repo.upsert(&session_for(&user, "token-1", None)).await.unwrap();
        let second = repo.upsert(&session_for(&user, "token-2", None)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.token_hash, hash_token("token-2"));

        assert!(
            repo.find_user_by_token_hash(&hash_token("token-1"), Utc::now())
                .await
                .unwrap()
                .is_none()
        );

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_raw_token_is_never_stored() {
        let (pool, provider) = setup().await;
        let user = create_user(&provider, "secret@example.com").await;

        provider
            .session()
            .upsert(&session_for(&user, "raw-token-value", None))
            .await
            .unwrap();

        let stored: String = sqlx::query_scalar("SELECT token_hash FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, "raw-token-value");
        assert_eq!(stored, hash_token("raw-token-value"));
    }

    #[tokio::test]
    async fn test_expired_sessions_are_filtered_and_cleaned() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "expired@example.com").await;
        let repo = provider.session();
        let now = Utc::now();

        repo.upsert(&session_for(&user, "token", Some(now - Duration::minutes(5))))
            .await
            .unwrap();

        assert!(
            repo.find_user_by_token_hash(&hash_token("token"), now)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_by_token_hash(&hash_token("token"), now)
                .await
                .unwrap()
                .is_none()
        );

        assert_eq!(repo.cleanup_expired(now).await.unwrap(), 1);
        assert_eq!(repo.cleanup_expired(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "delete@example.com").await;
        let repo = provider.session();

        repo.upsert(&session_for(&user, "token", None)).await.unwrap();
        repo.delete_by_token_hash(&hash_token("token")).await.unwrap();
        repo.delete_by_token_hash(&hash_token("token")).await.unwrap();

        assert!(
            repo.find_user_by_token_hash(&hash_token("token"), Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_by_user_id() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "all@example.com").await;
        let repo = provider.session();

        repo.upsert(&session_for(&user, "token", None)).await.unwrap();
        repo.delete_by_user_id(&user.id).await.unwrap();

        assert!(
            repo.find_by_token_hash(&hash_token("token"), Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }
}
