//! Uploaded videos and the records the gallery shows for them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The logical record of one stored video, created once at upload time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Random v4 id; the stored key is `{id}.{extension}`.
    pub id: Uuid,

    /// File name as sent by the client. Display only.
    pub original_file_name: String,

    /// Lower-cased text after the last `.` of the original name.
    pub extension: String,

    /// MIME type sent by the client.
    pub content_type: String,

    pub author: String,
    pub title: String,
    pub badge: String,
}

impl UploadedAsset {
    /// Key the asset is stored under.
    pub fn key(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }
}

/// One entry of the gallery listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub author: String,
    pub title: String,
    pub badge: String,
    pub image_url: String,
}

/// A gallery item together with the key it is stored under, for views that
/// link to playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryEntry {
    pub key: String,
    pub item: GalleryItem,
}

/// Lower-cased text after the last `.` in `file_name`.
///
/// A name without any `.` yields the whole name lower-cased, so `"noext"`
/// is stored as `{id}.noext`.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or(file_name)
        .to_lowercase()
}
