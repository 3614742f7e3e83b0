//! The object store seam the video library is written against.
//!
//! A container holds objects addressed by key, each with a byte payload, a
//! MIME type and a string-to-string metadata map. Backends only need to
//! support writing an object together with its metadata, enumerating every
//! object with its metadata, and opening an object for reading.

use crate::models::object::StoredObject;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::{collections::BTreeMap, io, pin::Pin};
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("object `{key}` not found in container `{container}`")]
    ObjectNotFound { container: String, key: String },
    #[error("object `{key}` already exists in container `{container}`")]
    ObjectAlreadyExists { container: String, key: String },
    #[error("invalid object key `{0}`")]
    InvalidObjectKey(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ContainerResult<T> = Result<T, ContainerError>;

/// Payload reader handed out by [`BlobContainer::open_object`].
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// An object together with its metadata map, as returned by a listing.
#[derive(Debug, Clone)]
pub struct ListedObject {
    pub object: StoredObject,
    pub metadata: BTreeMap<String, String>,
}

/// Outcome of one readiness check run by a backend.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessCheck {
    #[serde(skip)]
    pub name: &'static str,
    pub ok: bool,
    pub error: Option<String>,
}

impl ReadinessCheck {
    pub fn from_result(name: &'static str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                name,
                ok: true,
                error: None,
            },
            Err(error) => Self {
                name,
                ok: false,
                error: Some(error),
            },
        }
    }
}

#[async_trait]
pub trait BlobContainer: Send + Sync {
    /// Name of the container objects are written to.
    fn name(&self) -> &str;

    /// Write `contents` under `key` with its MIME type and metadata map.
    ///
    /// The object becomes visible to [`list_objects`](Self::list_objects)
    /// only once payload and metadata are both stored.
    async fn put_object(
        &self,
        key: &str,
        contents: Bytes,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> ContainerResult<StoredObject>;

    /// Every object in the container with its metadata, ordered by key.
    async fn list_objects(&self) -> ContainerResult<Vec<ListedObject>>;

    /// Open an object's payload for streaming.
    async fn open_object(&self, key: &str) -> ContainerResult<(StoredObject, ObjectReader)>;

    /// Backend-specific readiness checks.
    async fn readiness(&self) -> Vec<ReadinessCheck>;
}
