use async_trait::async_trait;
use lenslocked_core::{Error, User, UserId, repositories::UserRepository, user::NewUser};
use sqlx::SqlitePool;

use crate::{from_timestamp, storage_error};

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SqliteUser {
    id: String,
    email: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = Error;

    fn try_from(user: SqliteUser) -> Result<Self, Self::Error> {
        User::builder()
            .id(UserId::new(&user.id))
            .email(user.email)
            .created_at(from_timestamp(user.created_at)?)
            .updated_at(from_timestamp(user.updated_at)?)
            .build()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = chrono::Utc::now().timestamp();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, email, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create user", e))?;

        sqlite_user.try_into()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, email, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user", e))?;

        sqlite_user.map(TryInto::try_into).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, email, created_at, updated_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find user by email", e))?;

        sqlite_user.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        for statement in [
            "DELETE FROM sessions WHERE user_id = ?1",
            "DELETE FROM password_resets WHERE user_id = ?1",
            "DELETE FROM galleries WHERE user_id = ?1",
            "DELETE FROM users WHERE id = ?1",
        ] {
            sqlx::query(statement)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_error("Failed to delete user", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to delete user", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use lenslocked_core::{
        Gallery,
        error::StorageError,
        repositories::{GalleryRepository, GalleryRepositoryProvider, UserRepositoryProvider},
    };

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (_, provider) = setup().await;
        let repo = provider.user();

        let user = repo
            .create(NewUser::new("test@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(user.email, "test@example.com");

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id, user);

        let by_email = repo
            .find_by_email("test@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let (_, provider) = setup().await;
        let repo = provider.user();

        repo.create(NewUser::new("dup@example.com").unwrap())
            .await
            .unwrap();
        let err = repo
            .create(NewUser::new("dup@example.com").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Storage(StorageError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_removes_galleries() {
        let (_, provider) = setup().await;
        let user = provider
            .user()
            .create(NewUser::new("owner@example.com").unwrap())
            .await
            .unwrap();

        let gallery = Gallery::builder()
            .user_id(user.id.clone())
            .title("Trip".to_string())
            .build()
            .unwrap();
        provider.gallery().create(&gallery).await.unwrap();

        provider.user().delete(&user.id).await.unwrap();

        assert!(provider.user().find_by_id(&user.id).await.unwrap().is_none());
        assert!(
            provider
                .gallery()
                .find_by_user_id(&user.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
