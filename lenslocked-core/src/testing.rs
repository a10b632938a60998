//! In-memory repositories for service tests
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    Error, Gallery, GalleryId, PasswordReset, RepositoryProvider, Session, User, UserId,
    error::StorageError,
    repositories::{
        GalleryRepository, GalleryRepositoryProvider, PasswordRepository,
        PasswordRepositoryProvider, PasswordResetRepository, PasswordResetRepositoryProvider,
        SessionRepository, SessionRepositoryProvider, UserRepository, UserRepositoryProvider,
    },
    user::NewUser,
};

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Default)]
pub(crate) struct MockRepository {
    users: Mutex<HashMap<UserId, User>>,
    password_hashes: Mutex<HashMap<UserId, String>>,
    sessions: Mutex<HashMap<UserId, Session>>,
    password_resets: Mutex<HashMap<UserId, PasswordReset>>,
    galleries: Mutex<Vec<Gallery>>,
}

impl MockRepository {
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub(crate) async fn password_reset_count(&self) -> usize {
        self.password_resets.lock().await.len()
    }
}

#[async_trait]
impl UserRepository for MockRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(StorageError::UniqueViolation("users.email".to_string()).into());
        }
        let user = User::builder()
            .id(new_user.id)
            .email(new_user.email)
            .build()?;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.users.lock().await.remove(id);
        self.password_hashes.lock().await.remove(id);
        self.sessions.lock().await.remove(id);
        self.password_resets.lock().await.remove(id);
        self.galleries.lock().await.retain(|g| &g.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl PasswordRepository for MockRepository {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        self.password_hashes
            .lock()
            .await
            .insert(user_id.clone(), hash.to_string());
        Ok(())
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        Ok(self.password_hashes.lock().await.get(user_id).cloned())
    }
}

#[async_trait]
impl SessionRepository for MockRepository {
    async fn upsert(&self, session: &Session) -> Result<Session, Error> {
        let mut sessions = self.sessions.lock().await;
        let stored = match sessions.get(&session.user_id) {
            Some(existing) => Session {
                id: existing.id.clone(),
                created_at: existing.created_at,
                ..session.clone()
            },
            None => session.clone(),
        };
        sessions.insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error> {
        let session = SessionRepository::find_by_token_hash(self, token_hash, now).await?;
        let Some(session) = session else {
            return Ok(None);
        };
        Ok(self.users.lock().await.get(&session.user_id).cloned())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, Error> {
        Ok(self
            .sessions
            .lock()
            .await
            .values()
            .find(|s| s.token_hash == token_hash && !s.is_expired_at(now))
            .cloned())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), Error> {
        self.sessions
            .lock()
            .await
            .retain(|_, s| s.token_hash != token_hash);
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        self.sessions.lock().await.remove(user_id);
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl PasswordResetRepository for MockRepository {
    async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset, Error> {
        self.password_resets
            .lock()
            .await
            .insert(reset.user_id.clone(), reset.clone());
        Ok(reset.clone())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, Error> {
        Ok(self
            .password_resets
            .lock()
            .await
            .values()
            .find(|r| r.token_hash == token_hash)
            .cloned())
    }

    async fn redeem(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, Error> {
        let mut resets = self.password_resets.lock().await;
        let Some(user_id) = resets
            .values()
            .find(|r| r.token_hash == token_hash)
            .map(|r| r.user_id.clone())
        else {
            return Ok(None);
        };

        let reset = resets.remove(&user_id);
        if reset.as_ref().is_some_and(|r| !r.is_expired_at(now)) {
            self.password_hashes
                .lock()
                .await
                .insert(user_id, password_hash.to_string());
        }
        Ok(reset)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut resets = self.password_resets.lock().await;
        let before = resets.len();
        resets.retain(|_, r| !r.is_expired_at(now));
        Ok((before - resets.len()) as u64)
    }
}

#[async_trait]
impl GalleryRepository for MockRepository {
    async fn create(&self, gallery: &Gallery) -> Result<Gallery, Error> {
        self.galleries.lock().await.push(gallery.clone());
        Ok(gallery.clone())
    }

    async fn find_by_id(&self, id: &GalleryId) -> Result<Option<Gallery>, Error> {
        Ok(self
            .galleries
            .lock()
            .await
            .iter()
            .find(|g| &g.id == id)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        Ok(self
            .galleries
            .lock()
            .await
            .iter()
            .filter(|g| &g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_title(
        &self,
        id: &GalleryId,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Gallery, Error> {
        let mut galleries = self.galleries.lock().await;
        let gallery = galleries
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or(StorageError::NotFound)?;
        gallery.title = title.to_string();
        gallery.updated_at = Some(updated_at);
        Ok(gallery.clone())
    }

    async fn delete(&self, id: &GalleryId) -> Result<(), Error> {
        self.galleries.lock().await.retain(|g| &g.id != id);
        Ok(())
    }
}

impl UserRepositoryProvider for MockRepository {
    type UserRepo = Self;

    fn user(&self) -> &Self::UserRepo {
        self
    }
}

impl SessionRepositoryProvider for MockRepository {
    type SessionRepo = Self;

    fn session(&self) -> &Self::SessionRepo {
        self
    }
}

impl PasswordRepositoryProvider for MockRepository {
    type PasswordRepo = Self;

    fn password(&self) -> &Self::PasswordRepo {
        self
    }
}

impl PasswordResetRepositoryProvider for MockRepository {
    type PasswordResetRepo = Self;

    fn password_reset(&self) -> &Self::PasswordResetRepo {
        self
    }
}

impl GalleryRepositoryProvider for MockRepository {
    type GalleryRepo = Self;

    fn gallery(&self) -> &Self::GalleryRepo {
        self
    }
}

#[async_trait]
impl RepositoryProvider for MockRepository {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
