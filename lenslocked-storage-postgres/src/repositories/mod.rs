//! Repository implementations for PostgreSQL storage

pub mod gallery;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod user;

pub use gallery::PostgresGalleryRepository;
pub use password::PostgresPasswordRepository;
pub use password_reset::PostgresPasswordResetRepository;
pub use session::PostgresSessionRepository;
pub use user::PostgresUserRepository;

use async_trait::async_trait;
use lenslocked_core::{
    Error,
    error::StorageError,
    repositories::{
        GalleryRepositoryProvider, PasswordRepositoryProvider, PasswordResetRepositoryProvider,
        RepositoryProvider, SessionRepositoryProvider, UserRepositoryProvider,
    },
};
use sqlx::PgPool;

/// Repository provider implementation for PostgreSQL
pub struct PostgresRepositoryProvider {
    pool: PgPool,
    user: PostgresUserRepository,
    session: PostgresSessionRepository,
    password: PostgresPasswordRepository,
    password_reset: PostgresPasswordResetRepository,
    gallery: PostgresGalleryRepository,
}

impl PostgresRepositoryProvider {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user: PostgresUserRepository::new(pool.clone()),
            session: PostgresSessionRepository::new(pool.clone()),
            password: PostgresPasswordRepository::new(pool.clone()),
            password_reset: PostgresPasswordResetRepository::new(pool.clone()),
            gallery: PostgresGalleryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to `database_url` with a default pool
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| crate::storage_error("Failed to connect to database", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl UserRepositoryProvider for PostgresRepositoryProvider {
    type UserRepo = PostgresUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl SessionRepositoryProvider for PostgresRepositoryProvider {
    type SessionRepo = PostgresSessionRepository;

    fn session(&self) -> &Self::SessionRepo {
        &self.session
    }
}

impl PasswordRepositoryProvider for PostgresRepositoryProvider {
    type PasswordRepo = PostgresPasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.password
    }
}

impl PasswordResetRepositoryProvider for PostgresRepositoryProvider {
    type PasswordResetRepo = PostgresPasswordResetRepository;

    fn password_reset(&self) -> &Self::PasswordResetRepo {
        &self.password_reset
    }
}

impl GalleryRepositoryProvider for PostgresRepositoryProvider {
    type GalleryRepo = PostgresGalleryRepository;

    fn gallery(&self) -> &Self::GalleryRepo {
        &self.gallery
    }
}

#[async_trait]
impl RepositoryProvider for PostgresRepositoryProvider {
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
