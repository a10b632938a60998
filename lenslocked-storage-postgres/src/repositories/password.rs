use async_trait::async_trait;
use lenslocked_core::{Error, UserId, repositories::PasswordRepository};
use sqlx::PgPool;

use crate::storage_error;

pub struct PostgresPasswordRepository {
    pool: PgPool,
}

impl PostgresPasswordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordRepository for PostgresPasswordRepository {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(hash)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to set password hash", e))?;

        Ok(())
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        let result = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get password hash", e))?;

        Ok(result.flatten())
    }
}
