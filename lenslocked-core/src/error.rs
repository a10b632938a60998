//! Error types
//!
//! Every fallible operation in lenslocked returns [`Error`]. Internal failures
//! (database, entropy) stay opaque to end users; errors a user is allowed to see
//! are wrapped in [`Error::Public`] at the point where they are constructed,
//! carrying the message that may be rendered back to them.
use std::borrow::Cow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Gallery error: {0}")]
    Gallery(#[from] GalleryError),

    /// An error whose `message` may be shown to the end user.
    #[error("{source}")]
    Public {
        message: Cow<'static, str>,
        #[source]
        source: Box<Error>,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email address is already in use")]
    EmailTaken,

    #[error("unable to find a user with that email address")]
    UserNotFound,

    #[error("password is incorrect")]
    IncorrectPassword,

    #[error("password reset token is invalid or expired")]
    InvalidResetToken,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session")]
    InvalidSession,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Random source unavailable: {0}")]
    RandomSource(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery could not be found")]
    NotFound,

    #[error("invalid gallery id: {0}")]
    InvalidId(String),

    #[error("user does not have access to this gallery")]
    Forbidden,
}

impl AuthError {
    /// Wrap this error with the message shown to end users.
    pub fn into_public(self) -> Error {
        let message = match self {
            AuthError::EmailTaken => {
                "That email address is already associated with an account."
            }
            AuthError::UserNotFound => "We were unable to find a user with that email address.",
            AuthError::IncorrectPassword => "That password is incorrect.",
            AuthError::InvalidResetToken => "That password reset link is invalid or has expired.",
        };
        Error::public(self, message)
    }
}

impl GalleryError {
    /// Wrap this error with the message shown to end users.
    pub fn into_public(self) -> Error {
        let message = match self {
            GalleryError::NotFound => "Gallery not found",
            GalleryError::InvalidId(_) => "Invalid ID provided.",
            GalleryError::Forbidden => "You are not authorized to edit this gallery",
        };
        Error::public(self, message)
    }
}

impl Error {
    /// Mark `source` as safe to surface, with `message` as its user-facing text.
    pub fn public(source: impl Into<Error>, message: impl Into<Cow<'static, str>>) -> Self {
        Error::Public {
            message: message.into(),
            source: Box::new(source.into()),
        }
    }

    /// The message that may be shown to end users, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Error::Public { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The underlying error with any [`Error::Public`] wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Public { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self.root(), Error::Auth(_))
    }

    pub fn is_session_error(&self) -> bool {
        matches!(self.root(), Error::Session(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self.root(), Error::Storage(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self.root(), Error::Validation(_))
    }

    pub fn is_crypto_error(&self) -> bool {
        matches!(self.root(), Error::Crypto(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            Error::Storage(StorageError::NotFound) | Error::Gallery(GalleryError::NotFound)
        )
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self.root(), Error::Gallery(GalleryError::Forbidden))
    }
}
