use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, Session, SessionId, User, UserId, repositories::SessionRepository,
};
use sqlx::PgPool;

use crate::{repositories::user::PgUser, storage_error};

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PgSession {
    id: String,
    user_id: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<PgSession> for Session {
    fn from(session: PgSession) -> Self {
        Session {
            id: SessionId::new(&session.id),
            user_id: UserId::new(&session.user_id),
            token_hash: session.token_hash,
            created_at: session.created_at,
            updated_at: session.updated_at,
            expires_at: session.expires_at,
        }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn upsert(&self, session: &Session) -> Result<Session, Error> {
        let pg_session = sqlx::query_as::<_, PgSession>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                token_hash = EXCLUDED.token_hash,
                updated_at = EXCLUDED.updated_at,
                expires_at = EXCLUDED.expires_at
            RETURNING id, user_id, token_hash, created_at, updated_at, expires_at
            "#,
        )
        .bind(session.id.as_str())
        .bind(session.user_id.as_str())
        .bind(&session.token_hash)
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to upsert session", e))?;

        Ok(pg_session.into())
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let pg_user = sqlx::query_as::<_, PgUser>(
            r#"
            SELECT u.id, u.email, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1
              AND (s.expires_at IS NULL OR s.expires_at > $2)
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user by session", e))?;

        Ok(pg_user.map(Into::into))
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, Error> {
        let pg_session = sqlx::query_as::<_, PgSession>(
            r#"
            SELECT id, user_id, token_hash, created_at, updated_at, expires_at
            FROM sessions
            WHERE token_hash = $1 AND (expires_at IS NULL OR expires_at > $2)
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find session", e))?;

        Ok(pg_session.map(Into::into))
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete session", e))?;

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete sessions for user", e))?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to clean up expired sessions", e))?;

        Ok(result.rows_affected())
    }
}
