use crate::{
    Error, PasswordReset, User,
    crypto::{MIN_BYTES_PER_TOKEN, RawToken},
    error::AuthError,
    repositories::{PasswordResetRepository, UserRepository},
    services::{UserService, password::hash_password},
    validation::validate_password,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Password reset settings
#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    /// How long a reset token can be used. Defaults to one hour.
    pub expires_in: Duration,
    /// Bytes of entropy per token. Values below 32 are raised to 32.
    pub bytes_per_token: usize,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::hours(1),
            bytes_per_token: MIN_BYTES_PER_TOKEN,
        }
    }
}

impl PasswordResetConfig {
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    pub fn bytes_per_token(mut self, bytes_per_token: usize) -> Self {
        self.bytes_per_token = bytes_per_token;
        self
    }
}

/// Service for single-use password reset tokens
pub struct PasswordResetService<U: UserRepository, R: PasswordResetRepository> {
    user_service: Arc<UserService<U>>,
    repository: Arc<R>,
    config: PasswordResetConfig,
}

impl<U: UserRepository, R: PasswordResetRepository> PasswordResetService<U, R> {
    pub fn new(user_repository: Arc<U>, repository: Arc<R>) -> Self {
        Self::with_config(user_repository, repository, PasswordResetConfig::default())
    }

    pub fn with_config(
        user_repository: Arc<U>,
        repository: Arc<R>,
        config: PasswordResetConfig,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(user_repository)),
            repository,
            config,
        }
    }

    /// Issue a reset token for the account with this email.
    ///
    /// Returns `None` when no account matches, so callers can respond the
    /// same way whether or not the email is registered.
    pub async fn create(
        &self,
        email: &str,
    ) -> Result<Option<(User, RawToken, PasswordReset)>, Error> {
        let Some(user) = self.user_service.get_user_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(None);
        };

        let token = RawToken::generate(self.config.bytes_per_token)?;
        let now = Utc::now();
        let reset = PasswordReset::builder()
            .user_id(user.id.clone())
            .token_hash(token.hash())
            .created_at(now)
            .expires_at(now + self.config.expires_in)
            .build()?;

        let reset = self.repository.upsert(&reset).await?;
        tracing::debug!(user_id = %user.id, "Password reset created");

        Ok(Some((user, token, reset)))
    }

    /// Redeem a reset token and set the user's new password.
    ///
    /// The token is deleted whether it was valid or expired, and the password
    /// is written in the same storage transaction, so a token can only ever
    /// be redeemed once. A password that fails validation leaves the token
    /// usable.
    pub async fn redeem(&self, token: &RawToken, new_password: &str) -> Result<User, Error> {
        validate_password(new_password)?;

        let password_hash = hash_password(new_password);
        let now = Utc::now();
        let reset = self
            .repository
            .redeem(&token.hash(), &password_hash, now)
            .await?
            .ok_or_else(|| AuthError::InvalidResetToken.into_public())?;

        if reset.is_expired_at(now) {
            tracing::debug!(user_id = %reset.user_id, "Expired password reset token");
            return Err(AuthError::InvalidResetToken.into_public());
        }

        let user = self
            .user_service
            .get_user(&reset.user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidResetToken.into_public())?;

        tracing::debug!(user_id = %user.id, "Password reset redeemed");
        Ok(user)
    }

    /// Remove expired reset tokens, returning how many were deleted.
    pub async fn cleanup_expired(&self) -> Result<u64, Error> {
        self.repository.cleanup_expired(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ValidationError,
        repositories::PasswordRepository,
        testing::{MockRepository, init_tracing},
    };

    async fn setup(
        config: PasswordResetConfig,
    ) -> (
        Arc<MockRepository>,
        PasswordResetService<MockRepository, MockRepository>,
        User,
    ) {
        init_tracing();
        let repo = Arc::new(MockRepository::default());
        let user = UserService::new(repo.clone())
            .create_user("carol@example.com")
            .await
            .unwrap();
        let service = PasswordResetService::with_config(repo.clone(), repo.clone(), config);
        (repo, service, user)
    }

    fn assert_invalid_reset_token(err: Error) {
        assert!(matches!(
            err.root(),
            Error::Auth(AuthError::InvalidResetToken)
        ));
        assert!(err.user_message().is_some());
    }

    async fn password_matches(repo: &MockRepository, user: &User, password: &str) -> bool {
        let hash = repo.get_password_hash(&user.id).await.unwrap().unwrap();
        password_auth::verify_password(password, &hash).is_ok()
    }

    #[tokio::test]
    async fn test_create_and_redeem() {
        let (repo, service, user) = setup(PasswordResetConfig::default()).await;

        let (reset_user, token, reset) = service
            .create("Carol@Example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reset_user.id, user.id);
        assert_eq!(reset.token_hash, token.hash());

        let redeemed = service.redeem(&token, "new-password").await.unwrap();
        assert_eq!(redeemed.id, user.id);
        assert_eq!(repo.password_reset_count().await, 0);
        assert!(password_matches(&repo, &user, "new-password").await);

        // Single use
        assert_invalid_reset_token(service.redeem(&token, "other-password").await.unwrap_err());
        assert!(password_matches(&repo, &user, "new-password").await);
    }

    #[tokio::test]
    async fn test_concurrent_redeem_succeeds_once() {
        let (repo, service, user) = setup(PasswordResetConfig::default()).await;
        let (_, token, _) = service.create("carol@example.com").await.unwrap().unwrap();

        let (first, second) = tokio::join!(
            service.redeem(&token, "first-password"),
            service.redeem(&token, "second-password"),
        );
        assert_eq!(
            [first.is_ok(), second.is_ok()]
                .iter()
                .filter(|ok| **ok)
                .count(),
            1
        );

        let winner = if first.is_ok() {
            "first-password"
        } else {
            "second-password"
        };
        assert!(password_matches(&repo, &user, winner).await);
    }

    #[tokio::test]
    async fn test_invalid_password_keeps_token() {
        let (repo, service, _) = setup(PasswordResetConfig::default()).await;
        let (_, token, _) = service.create("carol@example.com").await.unwrap().unwrap();

        let err = service.redeem(&token, "short").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidPassword(_))
        ));
        assert_eq!(repo.password_reset_count().await, 1);

        assert!(service.redeem(&token, "long-enough").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_email_returns_none() {
        let (_, service, _) = setup(PasswordResetConfig::default()).await;

        assert!(service.create("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_request_replaces_previous_token() {
        let (repo, service, _) = setup(PasswordResetConfig::default()).await;

        let (_, first, _) = service.create("carol@example.com").await.unwrap().unwrap();
        let (_, second, _) = service.create("carol@example.com").await.unwrap().unwrap();
        assert_eq!(repo.password_reset_count().await, 1);

        assert_invalid_reset_token(service.redeem(&first, "new-password").await.unwrap_err());
        assert!(service.redeem(&second, "new-password").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_and_removed() {
        let config = PasswordResetConfig::default().expires_in(Duration::seconds(-1));
        let (repo, service, _) = setup(config).await;

        let (_, token, _) = service.create("carol@example.com").await.unwrap().unwrap();
        assert_invalid_reset_token(service.redeem(&token, "new-password").await.unwrap_err());
        assert_eq!(repo.password_reset_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let config = PasswordResetConfig::default().expires_in(Duration::seconds(-1));
        let (_, service, _) = setup(config).await;

        service.create("carol@example.com").await.unwrap();
        assert_eq!(service.cleanup_expired().await.unwrap(), 1);
    }
}
