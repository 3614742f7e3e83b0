//! Represents an object (blob) stored in a container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single stored object within a container.
///
/// Holds the backend's bookkeeping for the object, not the content bytes.
/// User-facing metadata lives in [`crate::models::metadata::ObjectMetadata`]
/// rows keyed by `id`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Name of the container holding this object.
    pub container: String,

    /// Object key, unique within the container.
    pub key: String,

    /// MIME type supplied at write time.
    pub content_type: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// Hex MD5 of the payload.
    pub etag: String,

    /// When the object was written.
    pub last_modified: DateTime<Utc>,
}
