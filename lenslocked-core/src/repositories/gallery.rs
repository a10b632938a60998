use crate::{Error, Gallery, GalleryId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for gallery data access
#[async_trait]
pub trait GalleryRepository: Send + Sync + 'static {
    /// Create a new gallery
    async fn create(&self, gallery: &Gallery) -> Result<Gallery, Error>;

    /// Find a gallery by ID
    async fn find_by_id(&self, id: &GalleryId) -> Result<Option<Gallery>, Error>;

    /// List the galleries owned by a user, oldest first
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error>;

    /// Change a gallery's title
    ///
    /// Fails with [`StorageError::NotFound`](crate::error::StorageError::NotFound)
    /// if no gallery has this ID.
    async fn update_title(
        &self,
        id: &GalleryId,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Gallery, Error>;

    /// Delete a gallery by ID
    async fn delete(&self, id: &GalleryId) -> Result<(), Error>;
}
