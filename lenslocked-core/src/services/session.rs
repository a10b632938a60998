//! Session lifecycle
//!
//! A session moves between two states per user: absent and active.
//! [`SessionService::create`] makes it active (rotating the token if it already
//! was), [`SessionService::revoke`] makes it absent again and
//! [`SessionService::authenticate`] only reads.
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    Error, Session, User, UserId,
    crypto::{MIN_BYTES_PER_TOKEN, RawToken},
    error::SessionError,
    repositories::SessionRepository,
};

/// Session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session stays valid after it is created. `None` keeps it
    /// valid until it is revoked or replaced.
    pub expires_in: Option<Duration>,
    /// Bytes of entropy per token. Values below 32 are raised to 32.
    pub bytes_per_token: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: None,
            bytes_per_token: MIN_BYTES_PER_TOKEN,
        }
    }
}

impl SessionConfig {
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    pub fn bytes_per_token(mut self, bytes_per_token: usize) -> Self {
        self.bytes_per_token = bytes_per_token;
        self
    }
}

/// Service for session management operations
pub struct SessionService<R: SessionRepository> {
    repository: Arc<R>,
    config: SessionConfig,
}

impl<R: SessionRepository> SessionService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, SessionConfig::default())
    }

    pub fn with_config(repository: Arc<R>, config: SessionConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a session for a user who has already proven their identity.
    ///
    /// Any previous session of the user is replaced, so tokens issued before
    /// stop working. The returned [`RawToken`] is the only copy of the token.
    pub async fn create(&self, user_id: &UserId) -> Result<(RawToken, Session), Error> {
        let token = RawToken::generate(self.config.bytes_per_token)?;
        let now = Utc::now();

        let session = Session::builder()
            .user_id(user_id.clone())
            .token_hash(token.hash())
            .created_at(now)
            .updated_at(now)
            .expires_at(self.config.expires_in.map(|ttl| now + ttl))
            .build()?;

        let session = self.repository.upsert(&session).await?;
        tracing::debug!(user_id = %user_id, session_id = %session.id, "Session created");

        Ok((token, session))
    }

    /// Resolve a token presented by a client to its user.
    ///
    /// Unknown, replaced, revoked and expired tokens all fail with
    /// [`SessionError::InvalidSession`].
    pub async fn authenticate(&self, token: &RawToken) -> Result<User, Error> {
        self.repository
            .find_user_by_token_hash(&token.hash(), Utc::now())
            .await?
            .ok_or_else(|| {
                tracing::debug!("Session token rejected");
                SessionError::InvalidSession.into()
            })
    }

    /// Look up the session row behind a token.
    pub async fn get_session(&self, token: &RawToken) -> Result<Session, Error> {
        let session = self
            .repository
            .find_by_token_hash(&token.hash(), Utc::now())
            .await?
            .ok_or(SessionError::InvalidSession)?;

        if !token.verify_hash(&session.token_hash) {
            return Err(SessionError::InvalidSession.into());
        }

        Ok(session)
    }

    /// End the session behind a token. Revoking an unknown token succeeds.
    pub async fn revoke(&self, token: &RawToken) -> Result<(), Error> {
        self.repository.delete_by_token_hash(&token.hash()).await?;
        tracing::debug!("Session revoked");
        Ok(())
    }

    /// End the session of a user, whatever token it carries.
    pub async fn revoke_all(&self, user_id: &UserId) -> Result<(), Error> {
        self.repository.delete_by_user_id(user_id).await?;
        tracing::debug!(user_id = %user_id, "Sessions revoked");
        Ok(())
    }

    /// Remove expired sessions, returning how many were deleted.
    pub async fn cleanup_expired(&self) -> Result<u64, Error> {
        let removed = self.repository.cleanup_expired(Utc::now()).await?;
        tracing::debug!(removed, "Expired sessions removed");
        Ok(removed)
    }
}
