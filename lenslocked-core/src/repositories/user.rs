use crate::{Error, User, UserId, user::NewUser};
use async_trait::async_trait;

/// Repository for user data access
///
/// Emails handed to this trait are already normalised to lower case.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user
    ///
    /// Fails with [`StorageError::UniqueViolation`](crate::error::StorageError::UniqueViolation)
    /// if the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Delete a user by ID, together with everything the user owns
    async fn delete(&self, id: &UserId) -> Result<(), Error>;
}
