//! Repository traits for data access
//!
//! Services never talk to a database directly. Each data domain has a
//! `*Repository` trait describing its operations, and a matching
//! `*RepositoryProvider` trait through which a storage backend hands out its
//! implementation. [`RepositoryProvider`] combines all of them with the
//! lifecycle methods a backend must support.
//!
//! To plug in a storage backend:
//! 1. Implement each `*Repository` trait
//! 2. Implement each `*RepositoryProvider` trait
//! 3. Implement [`RepositoryProvider`] with `migrate()` and `health_check()`

pub mod adapter;
pub mod gallery;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod user;

pub use adapter::{
    GalleryRepositoryAdapter, PasswordRepositoryAdapter, PasswordResetRepositoryAdapter,
    SessionRepositoryAdapter, UserRepositoryAdapter,
};
pub use gallery::GalleryRepository;
pub use password::PasswordRepository;
pub use password_reset::PasswordResetRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

pub trait PasswordRepositoryProvider: Send + Sync + 'static {
    type PasswordRepo: PasswordRepository;

    fn password(&self) -> &Self::PasswordRepo;
}

pub trait PasswordResetRepositoryProvider: Send + Sync + 'static {
    type PasswordResetRepo: PasswordResetRepository;

    fn password_reset(&self) -> &Self::PasswordResetRepo;
}

pub trait GalleryRepositoryProvider: Send + Sync + 'static {
    type GalleryRepo: GalleryRepository;

    fn gallery(&self) -> &Self::GalleryRepo;
}

/// A complete storage backend.
///
/// ```rust,ignore
/// use lenslocked_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl UserRepositoryProvider for MyStorage {
///     type UserRepo = MyUserRepository;
///     fn user(&self) -> &Self::UserRepo { &self.user_repo }
/// }
///
/// // ... the other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + SessionRepositoryProvider
    + PasswordRepositoryProvider
    + PasswordResetRepositoryProvider
    + GalleryRepositoryProvider
{
    /// Create the schema if it does not exist yet
    async fn migrate(&self) -> Result<(), Error>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<(), Error>;
}
