//! Metadata attached to stored objects.
//!
//! Backends persist metadata as plain string pairs ([`ObjectMetadata`]); the
//! application reads and writes it through the typed [`AssetMetadata`] view so
//! a missing key surfaces as `None` instead of a lookup failure.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const ORIGINAL_FILE_NAME: &str = "original_file_name";
pub const UUID: &str = "uuid";
pub const AUTHOR: &str = "author";
pub const TITLE: &str = "title";
pub const BADGE: &str = "badge";

/// Key-value metadata entry attached to an object.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ObjectMetadata {
    /// Reference to the associated object.
    pub object_id: Uuid,

    /// Metadata key (e.g. "author").
    pub key: String,

    /// Metadata value as plain text.
    pub value: String,
}

/// Typed view over the metadata map written for every uploaded video.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    pub original_file_name: Option<String>,
    pub uuid: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub badge: Option<String>,
}

impl AssetMetadata {
    /// Build the typed record from a raw metadata map. Unknown keys are ignored.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned();
        Self {
            original_file_name: get(ORIGINAL_FILE_NAME),
            uuid: get(UUID),
            author: get(AUTHOR),
            title: get(TITLE),
            badge: get(BADGE),
        }
    }

    /// Flatten into the string map handed to a backend. `None` fields are omitted.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        [
            (ORIGINAL_FILE_NAME, &self.original_file_name),
            (UUID, &self.uuid),
            (AUTHOR, &self.author),
            (TITLE, &self.title),
            (BADGE, &self.badge),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
        .collect()
    }
}
