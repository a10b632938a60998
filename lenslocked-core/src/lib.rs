//! Core functionality for the lenslocked photo gallery
//!
//! This crate contains the domain types shared by every other lenslocked crate:
//! users, sessions, password resets and galleries, together with the repository
//! traits that storage backends implement and the services that orchestrate them.
//!
//! The core crate is not intended to be used directly by application code. The
//! `lenslocked` crate wires the services together over a single
//! [`RepositoryProvider`] and is the recommended entry point.
//!
//! See [`Session`] for the session model, [`crypto`] for token generation and
//! hashing, and [`services::SessionService`] for the session lifecycle.
pub mod crypto;
pub mod error;
pub mod gallery;
pub mod id;
pub mod password_reset;
pub mod repositories;
pub mod services;
pub mod session;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use crypto::RawToken;
pub use error::Error;
pub use gallery::{Gallery, GalleryId};
pub use password_reset::{PasswordReset, PasswordResetId};
pub use repositories::RepositoryProvider;
pub use session::{Session, SessionId};
pub use user::{User, UserId};
