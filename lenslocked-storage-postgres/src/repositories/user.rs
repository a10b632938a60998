//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{Error, User, UserId, repositories::UserRepository, user::NewUser};
use sqlx::PgPool;

use crate::storage_error;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PgUser {
    id: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PgUser> for User {
    fn from(user: PgUser) -> Self {
        User {
            id: UserId::new(&user.id),
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let pg_user = sqlx::query_as::<_, PgUser>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            RETURNING id, email, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create user", e))?;

        Ok(pg_user.into())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let pg_user = sqlx::query_as::<_, PgUser>(
            "SELECT id, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user", e))?;

        Ok(pg_user.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let pg_user = sqlx::query_as::<_, PgUser>(
            "SELECT id, email, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user by email", e))?;

        Ok(pg_user.map(Into::into))
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        // sessions, password_resets and galleries cascade
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete user", e))?;

        Ok(())
    }
}
