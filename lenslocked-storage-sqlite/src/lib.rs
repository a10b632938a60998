//! SQLite storage backend for lenslocked
//!
//! [`SqliteRepositoryProvider`] implements every repository trait of
//! `lenslocked-core` over a single [`sqlx::SqlitePool`]. Timestamps are stored
//! as Unix seconds in `INTEGER` columns.
//!
//! ```rust,no_run
//! use lenslocked_core::RepositoryProvider;
//! use lenslocked_storage_sqlite::SqliteRepositoryProvider;
//! use sqlx::SqlitePool;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePool::connect("sqlite://lenslocked.db?mode=rwc").await?;
//! let repositories = SqliteRepositoryProvider::new(pool);
//! repositories.migrate().await?;
//! # Ok(())
//! # }
//! ```
mod repositories;
mod schema;

pub use repositories::{
    SqliteGalleryRepository, SqlitePasswordRepository, SqlitePasswordResetRepository,
    SqliteRepositoryProvider, SqliteSessionRepository, SqliteUserRepository,
};

use chrono::{DateTime, Utc};
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

pub(crate) fn from_timestamp(seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        tracing::error!(seconds, "Invalid timestamp in database");
        Error::Storage(StorageError::Database("Invalid timestamp".to_string()))
    })
}
