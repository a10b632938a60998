//! Sessions
//!
//! A session binds an opaque client token to a user. Only the digest of the
//! token is stored, and each user has at most one session: signing in again
//! replaces the digest, which invalidates every token issued before.
//!
//! | Field        | Type               | Description                                          |
//! | ------------ | ------------------ | ---------------------------------------------------- |
//! | `id`         | `SessionId`        | The unique identifier for the session row.           |
//! | `user_id`    | `UserId`           | The user the session belongs to (unique).            |
//! | `token_hash` | `String`           | SHA-256 digest of the raw token, base64 URL encoded. |
//! | `created_at` | `DateTime`         | When the row was first inserted.                     |
//! | `updated_at` | `DateTime`         | When the token was last rotated.                     |
//! | `expires_at` | `Option<DateTime>` | When the session stops being accepted, if ever.      |
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, error::ValidationError, id::prefixed_id, user::UserId};

prefixed_id!(
    /// Identifier of a session row. Never sent to clients.
    SessionId,
    "ses"
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Default)]
pub struct SessionBuilder {
    id: Option<SessionId>,
    user_id: Option<UserId>,
    token_hash: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionBuilder {
    pub fn id(mut self, id: SessionId) -> Self {
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

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn build(self) -> Result<Session, Error> {
        let now = Utc::now();
        let id = match self.id {
            Some(id) => id,
            None => SessionId::new_random()?,
        };
        Ok(Session {
            id,
            user_id: self.user_id.ok_or(ValidationError::MissingField(
                "User ID is required".to_string(),
            ))?,
            token_hash: self.token_hash.ok_or(ValidationError::MissingField(
                "Token hash is required".to_string(),
            ))?,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
            expires_at: self.expires_at,
        })
    }
}
