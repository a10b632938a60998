//! Password reset requests
//!
//! Reset tokens follow the same rules as session tokens: the raw value is sent
//! to the user once and only its digest is stored. A user has at most one
//! outstanding reset; requesting another replaces it.
use chrono::{DateTime, Utc};

use crate::{Error, error::ValidationError, id::prefixed_id, user::UserId};

prefixed_id!(PasswordResetId, "pwr");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub id: PasswordResetId,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn builder() -> PasswordResetBuilder {
        PasswordResetBuilder::default()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Default)]
pub struct PasswordResetBuilder {
    id: Option<PasswordResetId>,
    user_id: Option<UserId>,
    token_hash: Option<String>,
    created_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl PasswordResetBuilder {
    pub fn id(mut self, id: PasswordResetId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn token_hash(mut self, token_hash: String) -> Self {
        self.token_hash = Some(token_hash);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn build(self) -> Result<PasswordReset, Error> {
        let id = match self.id {
            Some(id) => id,
            None => PasswordResetId::new_random()?,
        };
        Ok(PasswordReset {
            id,
            user_id: self.user_id.ok_or(ValidationError::MissingField(
                "User ID is required".to_string(),
            ))?,
            token_hash: self.token_hash.ok_or(ValidationError::MissingField(
                "Token hash is required".to_string(),
            ))?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            expires_at: self.expires_at.ok_or(ValidationError::MissingField(
                "Expiry is required".to_string(),
            ))?,
        })
    }
}
