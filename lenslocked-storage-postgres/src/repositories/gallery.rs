use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lenslocked_core::{
    Error, Gallery, GalleryId, UserId, error::StorageError, repositories::GalleryRepository,
};
use sqlx::PgPool;

use crate::storage_error;

pub struct PostgresGalleryRepository {
    pool: PgPool,
}

impl PostgresGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PgGallery {
    id: String,
    user_id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<PgGallery> for Gallery {
    fn from(gallery: PgGallery) -> Self {
        Gallery {
            id: GalleryId::new(&gallery.id),
            user_id: UserId::new(&gallery.user_id),
            title: gallery.title,
            created_at: gallery.created_at,
            updated_at: gallery.updated_at,
        }
    }
}

#[async_trait]
impl GalleryRepository for PostgresGalleryRepository {
    async fn create(&self, gallery: &Gallery) -> Result<Gallery, Error> {
        let row = sqlx::query_as::<_, PgGallery>(
            r#"
            INSERT INTO galleries (id, user_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(gallery.id.as_str())
        .bind(gallery.user_id.as_str())
        .bind(&gallery.title)
        .bind(gallery.created_at)
        .bind(gallery.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create gallery", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &GalleryId) -> Result<Option<Gallery>, Error> {
        let row = sqlx::query_as::<_, PgGallery>(
            "SELECT id, user_id, title, created_at, updated_at FROM galleries WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to find gallery", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Gallery>, Error> {
        let rows = sqlx::query_as::<_, PgGallery>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM galleries
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list galleries", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_title(
        &self,
        id: &GalleryId,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Gallery, Error> {
        let row = sqlx::query_as::<_, PgGallery>(
            r#"
            UPDATE galleries SET title = $1, updated_at = $2
            WHERE id = $3
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(updated_at)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update gallery", e))?;

        row.map(Into::into)
            .ok_or(Error::Storage(StorageError::NotFound))
    }

    async fn delete(&self, id: &GalleryId) -> Result<(), Error> {
        sqlx::query("DELETE FROM galleries WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete gallery", e))?;

        Ok(())
    }
}
