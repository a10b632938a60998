use crate::{
    Error, Gallery, GalleryId, UserId,
    error::GalleryError,
    repositories::GalleryRepository,
    validation::validate_gallery_title,
};
use chrono::Utc;
use std::sync::Arc;

/// Service for gallery operations
///
/// Reads are public. Every write checks that the acting user owns the gallery.
pub struct GalleryService<R: GalleryRepository> {
    repository: Arc<R>,
}

impl<R: GalleryRepository> GalleryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: &UserId, title: &str) -> Result<Gallery, Error> {
        let title = validate_gallery_title(title)?;
        let gallery = Gallery::builder()
            .user_id(user_id.clone())
            .title(title)
            .build()?;

        let gallery = self.repository.create(&gallery).await?;
        tracing::debug!(user_id = %user_id, gallery_id = %gallery.id, "Gallery created");
        Ok(gallery)
    }

    /// Fetch any gallery by ID
    pub async fn get(&self, id: &GalleryId) -> Result<Gallery, Error> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GalleryError::NotFound.into_public())
    }

    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        self.repository.find_by_user_id(user_id).await
    }

    /// Fetch a gallery for editing, failing if `user_id` is not its owner
    pub async fn get_owned(&self, id: &GalleryId, user_id: &UserId) -> Result<Gallery, Error> {
        let gallery = self.get(id).await?;
        if !gallery.is_owned_by(user_id) {
            tracing::warn!(
                user_id = %user_id,
                gallery_id = %gallery.id,
                "User attempted to modify a gallery they do not own"
            );
            return Err(GalleryError::Forbidden.into_public());
        }
        Ok(gallery)
    }

    pub async fn update_title(
        &self,
        id: &GalleryId,
        user_id: &UserId,
        title: &str,
    ) -> Result<Gallery, Error> {
        let title = validate_gallery_title(title)?;
        let gallery = self.get_owned(id, user_id).await?;

        self.repository
            .update_title(&gallery.id, &title, Utc::now())
            .await
    }

    pub async fn delete(&self, id: &GalleryId, user_id: &UserId) -> Result<(), Error> {
        let gallery = self.get_owned(id, user_id).await?;
        self.repository.delete(&gallery.id).await?;
        tracing::debug!(user_id = %user_id, gallery_id = %gallery.id, "Gallery deleted");
        Ok(())
    }
}
