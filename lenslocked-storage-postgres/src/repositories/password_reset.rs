use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, PasswordReset, PasswordResetId, UserId, repositories::PasswordResetRepository,
};
use sqlx::PgPool;

use crate::storage_error;

pub struct PostgresPasswordResetRepository {
    pool: PgPool,
}

impl PostgresPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PgPasswordReset {
    id: String,
    user_id: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<PgPasswordReset> for PasswordReset {
    fn from(reset: PgPasswordReset) -> Self {
        PasswordReset {
            id: PasswordResetId::new(&reset.id),
            user_id: UserId::new(&reset.user_id),
            token_hash: reset.token_hash,
            created_at: reset.created_at,
            expires_at: reset.expires_at,
        }
    }
}

#[async_trait]
impl PasswordResetRepository for PostgresPasswordResetRepository {
    async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset, Error> {
        let row = sqlx::query_as::<_, PgPasswordReset>(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                token_hash = EXCLUDED.token_hash,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(reset.id.as_str())
        .bind(reset.user_id.as_str())
        .bind(&reset.token_hash)
        .bind(reset.created_at)
        .bind(reset.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to upsert password reset", e))?;

        Ok(row.into())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, Error> {
        let row = sqlx::query_as::<_, PgPasswordReset>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at
            FROM password_resets
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find password reset", e))?;

        Ok(row.map(Into::into))
    }

    async fn redeem(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        let row = sqlx::query_as::<_, PgPasswordReset>(
            r#"
            DELETE FROM password_resets
            WHERE token_hash = $1
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to redeem password reset", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let reset = PasswordReset::from(row);

        if !reset.is_expired_at(now) {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                .bind(password_hash)
                .bind(now)
                .bind(reset.user_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_error("Failed to set password hash", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to redeem password reset", e))?;

        Ok(Some(reset))
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to clean up expired password resets", e))?;

        Ok(result.rows_affected())
    }
}
