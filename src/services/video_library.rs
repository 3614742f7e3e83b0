//! VideoLibrary — uploads videos into a [`BlobContainer`] and lists them for
//! the gallery.
//!
//! Independent of the HTTP layer: handlers are thin wrappers over
//! [`VideoLibrary::store`] and [`VideoLibrary::list_all`].

use crate::{
    config::DisplayDefaults,
    models::{
        asset::{GalleryEntry, GalleryItem, UploadedAsset, file_extension},
        metadata::AssetMetadata,
        object::StoredObject,
    },
    services::blob_container::{BlobContainer, ContainerResult, ObjectReader, ReadinessCheck},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct VideoLibrary {
    container: Arc<dyn BlobContainer>,
    display: DisplayDefaults,
    placeholder_image_url: String,
}

impl VideoLibrary {
    pub fn new(
        container: Arc<dyn BlobContainer>,
        display: DisplayDefaults,
        placeholder_image_url: impl Into<String>,
    ) -> Self {
        Self {
            container,
            display,
            placeholder_image_url: placeholder_image_url.into(),
        }
    }

    /// Store an uploaded video under a fresh `{uuid}.{extension}` key.
    ///
    /// Every call creates a new object, even for identical input. Errors from
    /// the container are returned as-is; nothing is retried.
    pub async fn store(
        &self,
        file_name: &str,
        contents: Bytes,
        content_type: &str,
    ) -> ContainerResult<UploadedAsset> {
        let asset = UploadedAsset {
            id: Uuid::new_v4(),
            original_file_name: file_name.to_string(),
            extension: file_extension(file_name),
            content_type: content_type.to_string(),
            author: self.display.author.clone(),
            title: self.display.title.clone(),
            badge: self.display.badge.clone(),
        };
        let key = asset.key();

        let metadata = AssetMetadata {
            original_file_name: Some(asset.original_file_name.clone()),
            uuid: Some(asset.id.to_string()),
            author: Some(asset.author.clone()),
            title: Some(asset.title.clone()),
            badge: Some(asset.badge.clone()),
        };

        let stored = self
            .container
            .put_object(&key, contents, content_type, &metadata.to_map())
            .await?;

        info!(
            container = %self.container.name(),
            key = %key,
            original_file_name = %file_name,
            content_type = %content_type,
            size_bytes = stored.size_bytes,
            "Stored uploaded video"
        );

        Ok(asset)
    }

    /// Every video in the container as a gallery item, ordered by key.
    ///
    /// Metadata keys that are missing on an object come back as empty strings.
    pub async fn list_all(&self) -> ContainerResult<Vec<GalleryItem>> {
        Ok(self
            .list_entries()
            .await?
            .into_iter()
            .map(|entry| entry.item)
            .collect())
    }

    /// Same listing as [`VideoLibrary::list_all`], keeping each object's key.
    pub async fn list_entries(&self) -> ContainerResult<Vec<GalleryEntry>> {
        let listed = self.container.list_objects().await?;

        Ok(listed
            .into_iter()
            .map(|entry| {
                let meta = AssetMetadata::from_map(&entry.metadata);
                if meta.uuid.is_none() {
                    warn!(key = %entry.object.key, "object has no uuid metadata");
                }
                GalleryEntry {
                    key: entry.object.key,
                    item: GalleryItem {
                        id: meta.uuid.unwrap_or_default(),
                        author: meta.author.unwrap_or_default(),
                        title: meta.title.unwrap_or_default(),
                        badge: meta.badge.unwrap_or_default(),
                        image_url: self.placeholder_image_url.clone(),
                    },
                }
            })
            .collect())
    }

    /// Open a stored video for playback.
    pub async fn open(&self, key: &str) -> ContainerResult<(StoredObject, ObjectReader)> {
        self.container.open_object(key).await
    }

    pub async fn readiness(&self) -> Vec<ReadinessCheck> {
        self.container.readiness().await
    }
}
