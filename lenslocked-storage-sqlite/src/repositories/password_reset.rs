use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, PasswordReset, PasswordResetId, UserId, repositories::PasswordResetRepository,
};
use sqlx::SqlitePool;

use crate::{from_timestamp, storage_error};

pub struct SqlitePasswordResetRepository {
    pool: SqlitePool,
}

impl SqlitePasswordResetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqlitePasswordReset {
    id: String,
    user_id: String,
    token_hash: String,
    created_at: i64,
    expires_at: i64,
}

impl TryFrom<SqlitePasswordReset> for PasswordReset {
    type Error = Error;

    fn try_from(reset: SqlitePasswordReset) -> Result<Self, Self::Error> {
        PasswordReset::builder()
            .id(PasswordResetId::new(&reset.id))
            .user_id(UserId::new(&reset.user_id))
            .token_hash(reset.token_hash)
            .created_at(from_timestamp(reset.created_at)?)
            .expires_at(from_timestamp(reset.expires_at)?)
            .build()
    }
}

#[async_trait]
impl PasswordResetRepository for SqlitePasswordResetRepository {
    async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset, Error> {
        let row = sqlx::query_as::<_, SqlitePasswordReset>(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                token_hash = excluded.token_hash,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(reset.id.as_str())
        .bind(reset.user_id.as_str())
        .bind(&reset.token_hash)
        .bind(reset.created_at.timestamp())
        .bind(reset.expires_at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to upsert password reset", e))?;

        row.try_into()
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, Error> {
        let row = sqlx::query_as::<_, SqlitePasswordReset>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at
            FROM password_resets
            WHERE token_hash = ?1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find password reset", e))?;

        row.map(TryInto::try_into).transpose()
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

        let row = sqlx::query_as::<_, SqlitePasswordReset>(
            r#"
            DELETE FROM password_resets
            WHERE token_hash = ?1
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
        let reset = PasswordReset::try_from(row)?;

        if !reset.is_expired_at(now) {
            sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(password_hash)
                .bind(now.timestamp())
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
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at <= ?1")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to clean up expired password resets", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, setup};
    use chrono::Duration;
    use lenslocked_core::{
        crypto::hash_token,
        repositories::{
            PasswordRepository, PasswordRepositoryProvider, PasswordResetRepositoryProvider,
        },
    };

    fn reset_for(user_id: &UserId, token: &str, expires_at: DateTime<Utc>) -> PasswordReset {
        PasswordReset::builder()
            .user_id(user_id.clone())
            .token_hash(hash_token(token))
            .expires_at(expires_at)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_find_redeem() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "reset@example.com").await;
        let repo = provider.password_reset();
        let expires_at = Utc::now() + Duration::hours(1);

        let stored = repo
            .upsert(&reset_for(&user.id, "token", expires_at))
            .await
            .unwrap();
        let found = repo
            .find_by_token_hash(&hash_token("token"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, stored);

        let redeemed = repo
            .redeem(&hash_token("token"), "new-hash", Utc::now())
            .await
            .unwrap();
        assert_eq!(redeemed, Some(stored));
        assert_eq!(
            provider
                .password()
                .get_password_hash(&user.id)
                .await
                .unwrap()
                .as_deref(),
            Some("new-hash")
        );

        // Gone once redeemed
        assert!(
            repo.redeem(&hash_token("token"), "other-hash", Utc::now())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_by_token_hash(&hash_token("token"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_redeem_expired_leaves_password() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "late@example.com").await;
        let repo = provider.password_reset();
        let now = Utc::now();

        repo.upsert(&reset_for(&user.id, "token", now - Duration::minutes(1)))
            .await
            .unwrap();

        let redeemed = repo
            .redeem(&hash_token("token"), "new-hash", now)
            .await
            .unwrap()
            .unwrap();
        assert!(redeemed.is_expired_at(now));
        assert_eq!(
            provider.password().get_password_hash(&user.id).await.unwrap(),
            None
        );
        assert!(
            repo.find_by_token_hash(&hash_token("token"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_one_reset_per_user() {
        let (pool, provider) = setup().await;
        let user = create_user(&provider, "twice@example.com").await;
        let repo = provider.password_reset();
        let expires_at = Utc::now() + Duration::hours(1);

        repo.upsert(&reset_for(&user.id, "first", expires_at))
            .await
            .unwrap();
        repo.upsert(&reset_for(&user.id, "second", expires_at))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_resets")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(
            repo.find_by_token_hash(&hash_token("first"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "old@example.com").await;
        let repo = provider.password_reset();
        let now = Utc::now();

        repo.upsert(&reset_for(&user.id, "token", now - Duration::minutes(1)))
            .await
            .unwrap();

        assert_eq!(repo.cleanup_expired(now).await.unwrap(), 1);
    }
}
