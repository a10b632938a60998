use crate::{Error, Session, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for session data access
///
/// Sessions are keyed on `user_id`: a user has at most one row. Lookups take
/// the current time so that expired rows are filtered by the store itself.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Insert the session, or replace the token of the user's existing one.
    ///
    /// This must be a single atomic statement. On conflict the existing row
    /// keeps its `id` and `created_at`; `token_hash`, `updated_at` and
    /// `expires_at` are overwritten. Returns the row as stored.
    async fn upsert(&self, session: &Session) -> Result<Session, Error>;

    /// Find the user owning the unexpired session with this token hash
    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, Error>;

    /// Find the unexpired session with this token hash
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, Error>;

    /// Delete the session with this token hash. Deleting nothing is not an error.
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), Error>;

    /// Delete the session belonging to a user, if any
    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error>;

    /// Delete every session that expired at or before `now`, returning how many
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
