use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::CleanupPolicy;
use crate::core::error::{AppError, Result};
use crate::features::images::models::{Image, NewImage};
use crate::features::images::repository::ImageRepository;
use crate::features::sections::SectionRepository;
use crate::modules::storage::{unique_key, ObjectStore};
use crate::shared::constants::IMAGES_PREFIX;

/// Service for image operations
pub struct ImageService {
    images: Arc<dyn ImageRepository>,
    sections: Arc<dyn SectionRepository>,
    store: Arc<dyn ObjectStore>,
    cleanup_policy: CleanupPolicy,
}

impl ImageService {
    pub fn new(
        images: Arc<dyn ImageRepository>,
        sections: Arc<dyn SectionRepository>,
        store: Arc<dyn ObjectStore>,
        cleanup_policy: CleanupPolicy,
    ) -> Self {
        Self {
            images,
            sections,
            store,
            cleanup_policy,
        }
    }

    /// Upload an image and persist its metadata with an unset description
    ///
    /// The storage key carries a random token, so two uploads of the same
    /// original filename never overwrite each other. A failed upload aborts
    /// the operation with no row.
    pub async fn upload_image(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: &str,
        section_id: i32,
    ) -> Result<Image> {
        let section = self
            .sections
            .find_by_id(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Section {} does not exist", section_id)))?;

        let key = unique_key(IMAGES_PREFIX, file_name);
        let img_src = self.store.put(&key, data, content_type).await?;

        let image = self
            .images
            .insert(NewImage {
                img_src,
                section_id: section.id,
            })
            .await?;

        info!(
            "Uploaded image {} ('{}') for section {}",
            image.id, file_name, section.id
        );

        Ok(image)
    }

    /// All images of a section
    pub async fn section_images(&self, section_id: i32) -> Result<Vec<Image>> {
        self.images.find_by_section(section_id).await
    }

    /// Overwrite the description of an existing image
    ///
    /// Returns `Ok(false)` without writing anything when the id does not
    /// exist. `img_src` and the section reference are immutable through
    /// this path.
    pub async fn update_img_des(&self, idx: i32, img_des: Option<String>) -> Result<bool> {
        if self.images.find_by_id(idx).await?.is_none() {
            return Ok(false);
        }

        self.images.update_description(idx, img_des).await
    }

    /// Delete a single image; `Ok(false)` when the id does not exist
    pub async fn delete_image(&self, idx: i32) -> Result<bool> {
        let Some(image) = self.images.find_by_id(idx).await? else {
            return Ok(false);
        };

        self.cleanup_blob(&image.img_src).await?;
        self.images.delete_by_id(image.id).await?;

        info!("Deleted image {}", image.id);
        Ok(true)
    }

    /// Cascade used when a section is removed upstream: delete each image
    /// of the section in turn
    pub async fn delete_by_section(&self, idx: i32) -> Result<()> {
        let images = self.images.find_by_section(idx).await?;

        for image in images {
            self.delete_image(image.id).await?;
        }

        Ok(())
    }

    /// Direct URL under the image prefix for a bare filename
    ///
    /// Pure string construction; consults neither the store nor the
    /// database.
    pub fn file_url(&self, file_name: &str) -> String {
        self.store
            .public_url(&format!("{}/{}", IMAGES_PREFIX, file_name))
    }

    /// Delete the blob behind a persisted URL, honoring the cleanup policy
    async fn cleanup_blob(&self, img_src: &str) -> Result<()> {
        let deletion = match self.store.key_from_url(img_src) {
            Some(key) => self.store.delete(&key).await,
            None => Err(AppError::Storage(format!(
                "URL '{}' does not belong to the configured store",
                img_src
            ))),
        };

        match deletion {
            Ok(()) => Ok(()),
            Err(e) => match self.cleanup_policy {
                CleanupPolicy::BestEffort => {
                    warn!("Blob cleanup failed for '{}': {}", img_src, e);
                    Ok(())
                }
                CleanupPolicy::Strict => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{FakeObjectStore, InMemoryImages, InMemorySections};

    fn service() -> (Arc<InMemoryImages>, Arc<FakeObjectStore>, ImageService) {
        let images = Arc::new(InMemoryImages::new());
        let sections = Arc::new(InMemorySections::with_ids(&[5]));
        let store = Arc::new(FakeObjectStore::new());
        let service = ImageService::new(
            images.clone(),
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );
        (images, store, service)
    }

    #[tokio::test]
    async fn upload_requires_existing_section() {
        let (images, store, service) = service();

        let result = service
            .upload_image(b"jpg".to_vec(), "a.jpg", "image/jpeg", 42)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(images.len(), 0);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn upload_starts_with_unset_description() {
        let (_, store, service) = service();

        let image = service
            .upload_image(b"jpg".to_vec(), "a.jpg", "image/jpeg", 5)
            .await
            .unwrap();

        assert_eq!(image.section_id, 5);
        assert!(image.img_des.is_none());

        let key = store.key_from_url(&image.img_src).unwrap();
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("_a.jpg"));
        assert!(store.contains_key(&key));
    }

    #[tokio::test]
    async fn same_filename_never_collides() {
        let (_, _, service) = service();

        let first = service
            .upload_image(b"one".to_vec(), "a.jpg", "image/jpeg", 5)
            .await
            .unwrap();
        let second = service
            .upload_image(b"two".to_vec(), "a.jpg", "image/jpeg", 5)
            .await
            .unwrap();

        assert_ne!(first.img_src, second.img_src);
    }

    #[tokio::test]
    async fn upload_failure_writes_no_row() {
        let (images, store, service) = service();
        store.fail_puts();

        let result = service
            .upload_image(b"jpg".to_vec(), "a.jpg", "image/jpeg", 5)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(images.len(), 0);
    }

    #[tokio::test]
    async fn update_img_des_missing_id_is_a_noop() {
        let (_, _, service) = service();

        assert!(!service
            .update_img_des(999, Some("caption".to_string()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn update_img_des_touches_only_the_description() {
        let (images, _, service) = service();

        let image = service
            .upload_image(b"jpg".to_vec(), "a.jpg", "image/jpeg", 5)
            .await
            .unwrap();

        assert!(service
            .update_img_des(image.id, Some("crack in segment 3".to_string()))
            .await
            .unwrap());

        let updated = images.find_by_id(image.id).await.unwrap().unwrap();
        assert_eq!(updated.img_des.as_deref(), Some("crack in segment 3"));
        assert_eq!(updated.img_src, image.img_src);
        assert_eq!(updated.section_id, image.section_id);
    }

    #[tokio::test]
    async fn delete_image_removes_blob_and_row() {
        let (images, store, service) = service();

        let image = service
            .upload_image(b"jpg".to_vec(), "a.jpg", "image/jpeg", 5)
            .await
            .unwrap();
        let key = store.key_from_url(&image.img_src).unwrap();

        assert!(service.delete_image(image.id).await.unwrap());
        assert_eq!(store.delete_attempts(), 1);
        assert!(!store.contains_key(&key));
        assert_eq!(images.len(), 0);

        // Missing id is a no-op, not an error
        assert!(!service.delete_image(image.id).await.unwrap());
    }

    #[tokio::test]
    async fn section_cascade_deletes_every_image() {
        let (images, store, service) = service();

        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            service
                .upload_image(b"jpg".to_vec(), name, "image/jpeg", 5)
                .await
                .unwrap();
        }
        store.reset_delete_attempts();

        service.delete_by_section(5).await.unwrap();

        assert_eq!(images.len(), 0);
        assert_eq!(store.delete_attempts(), 3);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn file_url_is_pure_construction() {
        let (_, store, service) = service();

        assert_eq!(
            service.file_url("a.jpg"),
            format!("{}/images/a.jpg", store.base_url())
        );
        // Nothing was stored or deleted to answer that
        assert_eq!(store.object_count(), 0);
        assert_eq!(store.delete_attempts(), 0);
    }
}
