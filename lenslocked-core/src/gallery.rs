//! Galleries
//!
//! A gallery is a titled collection owned by one user. Anyone may view a
//! gallery; only its owner may edit or delete it.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::{GalleryError, ValidationError},
    id::prefixed_id,
    user::UserId,
};

prefixed_id!(
    /// A unique identifier for a gallery
    GalleryId,
    "gal"
);

impl GalleryId {
    /// Parse an id received from a client, rejecting anything that is not a
    /// well-formed gallery id.
    pub fn parse(id: &str) -> Result<Self, Error> {
        let id = GalleryId::new(id);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(GalleryError::InvalidId(id.into_inner()).into_public())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: GalleryId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// `None` until the title is first changed.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Gallery {
    pub fn builder() -> GalleryBuilder {
        GalleryBuilder::default()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[derive(Default)]
pub struct GalleryBuilder {
    id: Option<GalleryId>,
    user_id: Option<UserId>,
    title: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl GalleryBuilder {
    pub fn id(mut self, id: GalleryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: Option<DateTime<Utc>>) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn build(self) -> Result<Gallery, Error> {
        let id = match self.id {
            Some(id) => id,
            None => GalleryId::new_random()?,
        };
        Ok(Gallery {
            id,
            user_id: self.user_id.ok_or(ValidationError::MissingField(
                "User ID is required".to_string(),
            ))?,
            title: self
                .title
                .ok_or(ValidationError::MissingField("Title is required".to_string()))?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_builder() {
        let owner = UserId::new_random().unwrap();
        let gallery = Gallery::builder()
            .user_id(owner.clone())
            .title("Holidays".to_string())
            .build()
            .unwrap();

        assert!(gallery.id.is_valid());
        assert!(gallery.is_owned_by(&owner));
        assert!(!gallery.is_owned_by(&UserId::new_random().unwrap()));
        assert_eq!(gallery.updated_at, None);
    }

    #[test]
    fn test_parse_gallery_id() {
        let id = GalleryId::new_random().unwrap();
        assert_eq!(GalleryId::parse(id.as_str()).unwrap(), id);

        let err = GalleryId::parse("42").unwrap_err();
        assert_eq!(err.user_message(), Some("Invalid ID provided."));
        assert!(matches!(
            err.root(),
            Error::Gallery(GalleryError::InvalidId(_))
        ));
    }
}
