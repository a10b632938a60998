use crate::{
    Error, User, UserId,
    error::{AuthError, CryptoError, StorageError},
    repositories::{PasswordRepository, UserRepository},
    services::UserService,
    validation::validate_password,
};
use password_auth::VerifyError;
use std::sync::Arc;

/// Service for email and password accounts
pub struct PasswordService<U: UserRepository, P: PasswordRepository> {
    user_service: Arc<UserService<U>>,
    password_repository: Arc<P>,
}

impl<U: UserRepository, P: PasswordRepository> PasswordService<U, P> {
    pub fn new(user_repository: Arc<U>, password_repository: Arc<P>) -> Self {
        let user_service = Arc::new(UserService::new(user_repository));
        Self {
            user_service,
            password_repository,
        }
    }

    /// Register a new user with a password
    ///
    /// Fails with a public [`AuthError::EmailTaken`] if the email is already
    /// registered, including when a concurrent signup wins the race.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, Error> {
        validate_password(password)?;

        if self.user_service.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken.into_public());
        }

        let password_hash = hash_password(password);

        let user = match self.user_service.create_user(email).await {
            Ok(user) => user,
            Err(Error::Storage(StorageError::UniqueViolation(_))) => {
                return Err(AuthError::EmailTaken.into_public());
            }
            Err(e) => return Err(e),
        };

        self.password_repository
            .set_password_hash(&user.id, &password_hash)
            .await?;

        Ok(user)
    }

    /// Authenticate a user with email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self
            .user_service
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into_public())?;

        let password_hash = self
            .password_repository
            .get_password_hash(&user.id)
            .await?
            .ok_or_else(|| AuthError::IncorrectPassword.into_public())?;

        if !Self::verify_password(password, &password_hash)? {
            tracing::debug!(user_id = %user.id, "Password rejected");
            return Err(AuthError::IncorrectPassword.into_public());
        }

        Ok(user)
    }

    /// Change a user's password after checking the current one
    pub async fn change_password(
        &self,
        user_id: &UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;

        let current_hash = self
            .password_repository
            .get_password_hash(user_id)
            .await?
            .ok_or_else(|| AuthError::IncorrectPassword.into_public())?;

        if !Self::verify_password(old_password, &current_hash)? {
            return Err(AuthError::IncorrectPassword.into_public());
        }

        self.update_password(user_id, new_password).await
    }

    /// Set a user's password without checking the current one
    pub async fn update_password(&self, user_id: &UserId, password: &str) -> Result<(), Error> {
        validate_password(password)?;

        let password_hash = hash_password(password);
        self.password_repository
            .set_password_hash(user_id, &password_hash)
            .await?;
        tracing::debug!(user_id = %user_id, "Password updated");
        Ok(())
    }

    /// Verify a password against a stored hash
    ///
    /// A mismatch is `Ok(false)`; a stored hash that cannot be parsed is an error.
    fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
        match password_auth::verify_password(password, hash) {
            Ok(()) => Ok(true),
            Err(VerifyError::PasswordInvalid) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                Err(CryptoError::PasswordHash(e.to_string()).into())
            }
        }
    }
}

/// Hash a password using argon2
pub(crate) fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}
