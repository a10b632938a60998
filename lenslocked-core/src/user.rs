//! Users
//!
//! | Field        | Type       | Description                                   |
//! | ------------ | ---------- | --------------------------------------------- |
//! | `id`         | `UserId`   | The unique identifier for the user.           |
//! | `email`      | `String`   | The email of the user, always lower case.     |
//! | `created_at` | `DateTime` | The timestamp when the user was created.      |
//! | `updated_at` | `DateTime` | The timestamp when the user was last updated. |
//!
//! Password hashes are not part of [`User`]; they live behind
//! [`PasswordRepository`](crate::repositories::PasswordRepository) so a user
//! value can be handed to request handlers without carrying credentials.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::prefixed_id,
    validation::{normalize_email, validate_email},
};

prefixed_id!(
    /// A unique, stable identifier for a specific user
    UserId,
    "usr"
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    email: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
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

    pub fn build(self) -> Result<User, Error> {
        let now = Utc::now();
        let id = match self.id {
            Some(id) => id,
            None => UserId::new_random()?,
        };
        Ok(User {
            id,
            email: self
                .email
                .ok_or(ValidationError::MissingField("Email is required".to_string()))?,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
}

impl NewUser {
    /// Validate and normalise `email` and assign a fresh id.
    pub fn new(email: &str) -> Result<Self, Error> {
        let email = normalize_email(email);
        validate_email(&email)?;
        Ok(NewUser {
            id: UserId::new_random()?,
            email,
        })
    }
}
