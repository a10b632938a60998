use crate::{Error, PasswordReset};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for outstanding password resets
#[async_trait]
pub trait PasswordResetRepository: Send + Sync + 'static {
    /// Insert the reset, or replace the user's outstanding one
    async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset, Error>;

    /// Find a reset by token hash, expired or not
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, Error>;

    /// Delete the reset with this token hash and, unless it expired at or
    /// before `now`, set its user's password hash in the same transaction.
    ///
    /// Returns the deleted reset, expired or not. Of several concurrent calls
    /// with the same hash, at most one gets `Some`.
    async fn redeem(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, Error>;

    /// Delete every reset that expired at or before `now`, returning how many
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
