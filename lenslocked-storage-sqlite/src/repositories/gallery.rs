use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, Gallery, GalleryId, UserId, error::StorageError, repositories::GalleryRepository,
};
use sqlx::SqlitePool;

use crate::{from_timestamp, storage_error};

pub struct SqliteGalleryRepository {
    pool: SqlitePool,
}

impl SqliteGalleryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteGallery {
    id: String,
    user_id: String,
    title: String,
    created_at: i64,
    updated_at: Option<i64>,
}

impl TryFrom<SqliteGallery> for Gallery {
    type Error = Error;

    fn try_from(gallery: SqliteGallery) -> Result<Self, Self::Error> {
        Gallery::builder()
            .id(GalleryId::new(&gallery.id))
            .user_id(UserId::new(&gallery.user_id))
            .title(gallery.title)
            .created_at(from_timestamp(gallery.created_at)?)
            .updated_at(gallery.updated_at.map(from_timestamp).transpose()?)
            .build()
    }
}

#[async_trait]
impl GalleryRepository for SqliteGalleryRepository {
    async fn create(&self, gallery: &Gallery) -> Result<Gallery, Error> {
        let row = sqlx::query_as::<_, SqliteGallery>(
            r#"
            INSERT INTO galleries (id, user_id, title, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(gallery.id.as_str())
        .bind(gallery.user_id.as_str())
        .bind(&gallery.title)
        .bind(gallery.created_at.timestamp())
        .bind(gallery.updated_at.map(|t| t.timestamp()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create gallery", e))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &GalleryId) -> Result<Option<Gallery>, Error> {
        let row = sqlx::query_as::<_, SqliteGallery>(
            "SELECT id, user_id, title, created_at, updated_at FROM galleries WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find gallery", e))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        let rows = sqlx::query_as::<_, SqliteGallery>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM galleries
            WHERE user_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list galleries", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_title(
        &self,
        id: &GalleryId,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Gallery, Error> {
        let row = sqlx::query_as::<_, SqliteGallery>(
            r#"
            UPDATE galleries SET title = ?1, updated_at = ?2
            WHERE id = ?3
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(updated_at.timestamp())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update gallery", e))?
        .ok_or(Error::Storage(StorageError::NotFound))?;

        row.try_into()
    }

    async fn delete(&self, id: &GalleryId) -> Result<(), Error> {
        sqlx::query("DELETE FROM galleries WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete gallery", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, setup};
    use lenslocked_core::repositories::GalleryRepositoryProvider;

    fn gallery_for(user_id: &UserId, title: &str) -> Gallery {
        Gallery::builder()
            .user_id(user_id.clone())
            .title(title.to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_find_list() {
        let (_, provider) = setup().await;
        let alice = create_user(&provider, "alice@example.com").await;
        let bob = create_user(&provider, "bob@example.com").await;
        let repo = provider.gallery();

        let first = repo.create(&gallery_for(&alice.id, "First")).await.unwrap();
        repo.create(&gallery_for(&alice.id, "Second")).await.unwrap();
        repo.create(&gallery_for(&bob.id, "Bob's")).await.unwrap();

        let found = repo.find_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(found, first);
        assert_eq!(found.updated_at, None);

        let titles: Vec<_> = repo
            .find_by_user_id(&alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_update_title() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "editor@example.com").await;
        let repo = provider.gallery();

        let gallery = repo.create(&gallery_for(&user.id, "Before")).await.unwrap();
        let updated = repo
            .update_title(&gallery.id, "After", Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.title, "After");
        assert!(updated.updated_at.is_some());

        let missing = GalleryId::new_random().unwrap();
        let err = repo
            .update_title(&missing, "Nope", Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_, provider) = setup().await;
        let user = create_user(&provider, "deleter@example.com").await;
        let repo = provider.gallery();

        let gallery = repo.create(&gallery_for(&user.id, "Temp")).await.unwrap();
        repo.delete(&gallery.id).await.unwrap();
        assert!(repo.find_by_id(&gallery.id).await.unwrap().is_none());
    }
}
