use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error, Gallery, GalleryId, PasswordReset, Session, User, UserId,
    repositories::{
        GalleryRepository, PasswordRepository, PasswordResetRepository, RepositoryProvider,
        SessionRepository, UserRepository,
    },
    user::NewUser,
};

/// Adapter that exposes the user repository of a shared [`RepositoryProvider`]
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.provider.user().delete(id).await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn upsert(&self, session: &Session) -> Result<Session, Error> {
        self.provider.session().upsert(session).await
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        self.provider
            .session()
            .find_user_by_token_hash(token_hash, now)
            .await
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, Error> {
        self.provider
            .session()
            .find_by_token_hash(token_hash, now)
            .await
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), Error> {
        self.provider.session().delete_by_token_hash(token_hash).await
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        self.provider.session().delete_by_user_id(user_id).await
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.session().cleanup_expired(now).await
    }
}

pub struct PasswordRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRepository for PasswordRepositoryAdapter<R> {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        self.provider
            .password()
            .set_password_hash(user_id, hash)
            .await
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        self.provider.password().get_password_hash(user_id).await
    }
}

pub struct PasswordResetRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordResetRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordResetRepository for PasswordResetRepositoryAdapter<R> {
    async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset, Error> {
        self.provider.password_reset().upsert(reset).await
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, Error> {
        self.provider
            .password_reset()
            .find_by_token_hash(token_hash)
            .await
    }

    async fn redeem(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, Error> {
        self.provider
            .password_reset()
            .redeem(token_hash, password_hash, now)
            .await
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.password_reset().cleanup_expired(now).await
    }
}

pub struct GalleryRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> GalleryRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> GalleryRepository for GalleryRepositoryAdapter<R> {
    async fn create(&self, gallery: &Gallery) -> Result<Gallery, Error> {
        self.provider.gallery().create(gallery).await
    }

    async fn find_by_id(&self, id: &GalleryId) -> Result<Option<Gallery>, Error> {
        self.provider.gallery().find_by_id(id).await
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        self.provider.gallery().find_by_user_id(user_id).await
    }

    async fn update_title(
        &self,
        id: &GalleryId,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Gallery, Error> {
        self.provider
            .gallery()
            .update_title(id, title, updated_at)
            .await
    }

    async fn delete(&self, id: &GalleryId) -> Result<(), Error> {
        self.provider.gallery().delete(id).await
    }
}
