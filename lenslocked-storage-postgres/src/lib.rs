//! PostgreSQL storage backend for lenslocked
//!
//! [`PostgresRepositoryProvider`] implements every repository trait of
//! `lenslocked-core` over a [`sqlx::PgPool`]. Timestamps are `TIMESTAMPTZ`.
mod repositories;
mod schema;

pub use repositories::{
    PostgresGalleryRepository, PostgresPasswordRepository, PostgresPasswordResetRepository,
    PostgresRepositoryProvider, PostgresSessionRepository, PostgresUserRepository,
};

use lenslocked_core::{Error, error::StorageError};

/// Log a sqlx failure and turn it into an opaque storage error.
///
/// Unique constraint violations keep their own variant so services can map
/// them to domain errors.
pub(crate) fn storage_error(context: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            tracing::debug!(error = %e, "{context}");
            return Error::Storage(StorageError::UniqueViolation(
                db.constraint().unwrap_or("unique").to_string(),
            ));
        }
    }
    tracing::error!(error = %e, "{context}");
    Error::Storage(StorageError::Database(context.to_string()))
}
