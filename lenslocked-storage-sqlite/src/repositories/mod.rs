//! Repository implementations for SQLite storage

pub mod gallery;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod user;

pub use gallery::SqliteGalleryRepository;
pub use password::SqlitePasswordRepository;
pub use password_reset::SqlitePasswordResetRepository;
pub use session::SqliteSessionRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use lenslocked_core::{
    Error,
    error::StorageError,
    repositories::{
        GalleryRepositoryProvider, PasswordRepositoryProvider, PasswordResetRepositoryProvider,
        RepositoryProvider, SessionRepositoryProvider, UserRepositoryProvider,
    },
};
use sqlx::SqlitePool;

/// Repository provider implementation for SQLite
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: SqliteUserRepository,
    session: SqliteSessionRepository,
    password: SqlitePasswordRepository,
    password_reset: SqlitePasswordResetRepository,
    gallery: SqliteGalleryRepository,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user: SqliteUserRepository::new(pool.clone()),
            session: SqliteSessionRepository::new(pool.clone()),
            password: SqlitePasswordRepository::new(pool.clone()),
            password_reset: SqlitePasswordResetRepository::new(pool.clone()),
            gallery: SqliteGalleryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to `database_url`, e.g. `sqlite://lenslocked.db?mode=rwc`
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| crate::storage_error("Failed to connect to database", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl SessionRepositoryProvider for SqliteRepositoryProvider {
    type SessionRepo = SqliteSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl PasswordRepositoryProvider for SqliteRepositoryProvider {
    type PasswordRepo = SqlitePasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.password
    }
}

impl PasswordResetRepositoryProvider for SqliteRepositoryProvider {
    type PasswordResetRepo = SqlitePasswordResetRepository;

    fn password_reset(&self) -> &Self::PasswordResetRepo {
        &self.password_reset
    }
}

impl GalleryRepositoryProvider for SqliteRepositoryProvider {
    type GalleryRepo = SqliteGalleryRepository;

    fn gallery(&self) -> &Self::GalleryRepo {
        &self.gallery
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        crate::schema::create_schema(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create schema");
            Error::Storage(StorageError::Schema(
                "Failed to create schema".to_string(),
            ))
        })
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| crate::storage_error("Health check failed", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::setup;
    use lenslocked_core::RepositoryProvider;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (_, provider) = setup().await;
        provider.migrate().await.unwrap();
        provider.health_check().await.unwrap();
    }
}
