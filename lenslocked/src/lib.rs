//! # Lenslocked
//!
//! Accounts, sessions and photo galleries for the lenslocked web application.
//!
//! [`Lenslocked`] wires the services of `lenslocked-core` together over a
//! single [`RepositoryProvider`], so an application only has to choose a
//! storage backend and hand it in:
//!
//! - Email and password signup and signin
//! - One opaque session token per user, stored only as a SHA-256 digest
//! - Single-use password reset tokens
//! - Galleries that anyone can view and only their owner can edit
//!
//! ## Storage Support
//!
//! - SQLite (`sqlite` feature, enabled by default)
//! - PostgreSQL (`postgres` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use lenslocked::{Lenslocked, SqliteRepositoryProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lenslocked::Error> {
//!     let repositories = SqliteRepositoryProvider::connect("sqlite://lenslocked.db?mode=rwc").await?;
//!     let lenslocked = Lenslocked::new(Arc::new(repositories));
//!     lenslocked.migrate().await?;
//!
//!     let (user, token, _session) = lenslocked.signup("bob@example.com", "hunter2hunter2").await?;
//!     let same_user = lenslocked.authenticate(&token).await?;
//!     assert_eq!(user.id, same_user.id);
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use lenslocked_core::{
    repositories::{
        GalleryRepositoryAdapter, PasswordRepositoryAdapter, PasswordResetRepositoryAdapter,
        SessionRepositoryAdapter, UserRepositoryAdapter,
    },
    services::{GalleryService, PasswordResetService, PasswordService, SessionService, UserService},
};

/// Re-export core types from lenslocked_core
///
/// These types are commonly used when working with the Lenslocked API.
pub use lenslocked_core::{
    Error, Gallery, GalleryId, PasswordReset, PasswordResetId, RawToken, RepositoryProvider,
    Session, SessionId, User, UserId,
    error::{AuthError, GalleryError, SessionError, StorageError, ValidationError},
    services::{PasswordResetConfig, SessionConfig},
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature is enabled.
#[cfg(feature = "sqlite")]
pub use lenslocked_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "postgres")]
pub use lenslocked_storage_postgres::PostgresRepositoryProvider;

type Users<R> = UserRepositoryAdapter<R>;

/// The coordinator for every lenslocked operation.
///
/// All services share one repository provider. Cloning is cheap.
pub struct Lenslocked<R: RepositoryProvider> {
    repositories: Arc<R>,
    user_service: Arc<UserService<Users<R>>>,
    password_service: Arc<PasswordService<Users<R>, PasswordRepositoryAdapter<R>>>,
    session_service: Arc<SessionService<SessionRepositoryAdapter<R>>>,
    password_reset_service: Arc<PasswordResetService<Users<R>, PasswordResetRepositoryAdapter<R>>>,
    gallery_service: Arc<GalleryService<GalleryRepositoryAdapter<R>>>,
}

impl<R: RepositoryProvider> Clone for Lenslocked<R> {
    fn clone(&self) -> Self {
        Self {
            repositories: self.repositories.clone(),
            user_service: self.user_service.clone(),
            password_service: self.password_service.clone(),
            session_service: self.session_service.clone(),
            password_reset_service: self.password_reset_service.clone(),
            gallery_service: self.gallery_service.clone(),
        }
    }
}

impl<R: RepositoryProvider> Lenslocked<R> {
    /// Create a new instance with default session and password reset settings
    pub fn new(repositories: Arc<R>) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));

        Self {
            user_service: Arc::new(UserService::new(user_repo.clone())),
            password_service: Arc::new(PasswordService::new(
                user_repo.clone(),
                Arc::new(PasswordRepositoryAdapter::new(repositories.clone())),
            )),
            session_service: Arc::new(SessionService::new(Arc::new(
                SessionRepositoryAdapter::new(repositories.clone()),
            ))),
            password_reset_service: Arc::new(PasswordResetService::new(
                user_repo,
                Arc::new(PasswordResetRepositoryAdapter::new(repositories.clone())),
            )),
            gallery_service: Arc::new(GalleryService::new(Arc::new(
                GalleryRepositoryAdapter::new(repositories.clone()),
            ))),
            repositories,
        }
    }

    /// Set the session configuration
    ///
    /// Only sessions created afterwards pick up the new settings.
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        let session_repo = Arc::new(SessionRepositoryAdapter::new(self.repositories.clone()));
        self.session_service = Arc::new(SessionService::with_config(session_repo, config));
        self
    }

    /// Set the password reset configuration
    pub fn with_password_reset_config(mut self, config: PasswordResetConfig) -> Self {
        self.password_reset_service = Arc::new(PasswordResetService::with_config(
            Arc::new(UserRepositoryAdapter::new(self.repositories.clone())),
            Arc::new(PasswordResetRepositoryAdapter::new(
                self.repositories.clone(),
            )),
            config,
        ));
        self
    }

    /// Create any missing tables
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Check that the storage backend is reachable
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Get a user by their ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// Delete a user together with their sessions, reset tokens and galleries
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.user_service.delete_user(user_id).await
    }
}

/// Accounts
impl<R: RepositoryProvider> Lenslocked<R> {
    /// Register a user with a password and sign them in
    ///
    /// # Returns
    ///
    /// The new user, the session token to hand to the client, and the session
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, RawToken, Session), Error> {
        let user = self.password_service.register(email, password).await?;
        let (token, session) = self.session_service.create(&user.id).await?;
        tracing::info!(user_id = %user.id, "User signed up");
        Ok((user, token, session))
    }

    /// Check a user's password and start a new session
    ///
    /// Any session the user already had is replaced.
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, RawToken, Session), Error> {
        let user = self.password_service.authenticate(email, password).await?;
        let (token, session) = self.session_service.create(&user.id).await?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok((user, token, session))
    }

    /// End the session behind `token`
    pub async fn signout(&self, token: &RawToken) -> Result<(), Error> {
        self.session_service.revoke(token).await
    }

    /// Change a user's password and end their session.
    ///
    /// The old password must be correct. The user has to sign in again
    /// with the new password afterwards.
    pub async fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        self.password_service
            .change_password(user_id, old_password, new_password)
            .await?;

        self.session_service.revoke_all(user_id).await
    }
}

/// Sessions
impl<R: RepositoryProvider> Lenslocked<R> {
    /// Start a session for a user whose identity is already established
    pub async fn create_session(&self, user_id: &UserId) -> Result<(RawToken, Session), Error> {
        self.session_service.create(user_id).await
    }

    /// Resolve a session token to its user
    pub async fn authenticate(&self, token: &RawToken) -> Result<User, Error> {
        self.session_service.authenticate(token).await
    }

    /// Get the session behind a token
    pub async fn get_session(&self, token: &RawToken) -> Result<Session, Error> {
        self.session_service.get_session(token).await
    }

    /// End every session of a user
    pub async fn revoke_sessions_for_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.session_service.revoke_all(user_id).await
    }

    /// Remove expired sessions and password reset tokens.
    ///
    /// # Returns
    ///
    /// How many sessions and reset tokens were removed, in that order
    pub async fn cleanup_expired(&self) -> Result<(u64, u64), Error> {
        let sessions = self.session_service.cleanup_expired().await?;
        let resets = self.password_reset_service.cleanup_expired().await?;
        Ok((sessions, resets))
    }
}

/// Password reset
impl<R: RepositoryProvider> Lenslocked<R> {
    /// Issue a password reset token for the account registered with `email`.
    ///
    /// Returns `None` when there is no such account. Delivering the token to
    /// the user is up to the caller.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(User, RawToken, PasswordReset)>, Error> {
        self.password_reset_service.create(email).await
    }

    /// Redeem a reset token, set a new password and sign the user in
    ///
    /// Spending the token and storing the new password happen in one storage
    /// transaction. A password that fails validation leaves the token
    /// usable. If creating the session fails afterwards, the new password is
    /// already in place and the user can sign in with it.
    pub async fn reset_password(
        &self,
        token: &RawToken,
        new_password: &str,
    ) -> Result<(User, RawToken, Session), Error> {
        let user = self
            .password_reset_service
            .redeem(token, new_password)
            .await?;

        let (token, session) = self.session_service.create(&user.id).await?;
        tracing::info!(user_id = %user.id, "Password reset");
        Ok((user, token, session))
    }
}

/// Galleries
impl<R: RepositoryProvider> Lenslocked<R> {
    pub async fn create_gallery(&self, user_id: &UserId, title: &str) -> Result<Gallery, Error> {
        self.gallery_service.create(user_id, title).await
    }

    /// Get any gallery. Viewing does not require ownership.
    pub async fn get_gallery(&self, id: &GalleryId) -> Result<Gallery, Error> {
        self.gallery_service.get(id).await
    }

    /// Get a gallery for editing, failing unless `user_id` owns it
    pub async fn get_owned_gallery(
        &self,
        id: &GalleryId,
        user_id: &UserId,
    ) -> Result<Gallery, Error> {
        self.gallery_service.get_owned(id, user_id).await
    }

    pub async fn list_galleries(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        self.gallery_service.list_for_user(user_id).await
    }

    pub async fn update_gallery(
        &self,
        id: &GalleryId,
        user_id: &UserId,
        title: &str,
    ) -> Result<Gallery, Error> {
        self.gallery_service.update_title(id, user_id, title).await
    }

    pub async fn delete_gallery(&self, id: &GalleryId, user_id: &UserId) -> Result<(), Error> {
        self.gallery_service.delete(id, user_id).await
    }
}
