use std::sync::Arc;

use crate::{
    Error, User, UserId,
    repositories::UserRepository,
    user::NewUser,
    validation::normalize_email,
};

/// Service for user management operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new user with the given email
    ///
    /// The email is validated and lower-cased before it is stored.
    pub async fn create_user(&self, email: &str) -> Result<User, Error> {
        let new_user = NewUser::new(email)?;
        let user = self.repository.create(new_user).await?;
        tracing::debug!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository
            .find_by_email(&normalize_email(email))
            .await
    }

    /// Delete a user and everything they own
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.repository.delete(user_id).await?;
        tracing::debug!(user_id = %user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRepository;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let service = UserService::new(Arc::new(MockRepository::default()));

        let user = service.create_user("Test@Example.com").await.unwrap();
        assert_eq!(user.email, "test@example.com");

        let fetched = service.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched, user);

        let by_email = service
            .get_user_by_email("TEST@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_email() {
        let service = UserService::new(Arc::new(MockRepository::default()));

        let err = service.create_user("not-an-email").await.unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = UserService::new(Arc::new(MockRepository::default()));

        let user = service.create_user("gone@example.com").await.unwrap();
        service.delete_user(&user.id).await.unwrap();

        assert!(service.get_user(&user.id).await.unwrap().is_none());
    }
}
