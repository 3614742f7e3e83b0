//! src/services/local_container.rs
//!
//! LocalContainer — a [`BlobContainer`] backed by SQLite for object rows and
//! metadata, and local disk for payloads sharded beneath
//! `base_path/{container}/{shard}/{shard}/{key}`.

use crate::{
    models::{metadata::ObjectMetadata, object::StoredObject},
    services::blob_container::{
        BlobContainer, ContainerError, ContainerResult, ListedObject, ObjectReader, ReadinessCheck,
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{
    collections::{BTreeMap, HashMap},
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Instant,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Schema applied by [`LocalContainer::migrate`].
const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Clone)]
pub struct LocalContainer {
    /// Shared SQLite connection pool used for object rows and metadata.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where object payloads are stored.
    pub base_path: PathBuf,

    name: String,
}

impl LocalContainer {
    pub fn new(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            name: name.into(),
        }
    }

    /// Open (creating if needed) the SQLite database at `database_url` and the
    /// payload directory at `base_path`, then apply the schema.
    pub async fn connect(
        database_url: &str,
        base_path: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> ContainerResult<Self> {
        let base_path = base_path.into();
        if !fs::try_exists(&base_path).await? {
            fs::create_dir_all(&base_path).await?;
            info!("Created storage directory at {}", base_path.display());
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await? {
                fs::create_dir_all(parent).await?;
                info!("Created missing directory {:?}", parent);
            }
        }
        debug!("Connecting to SQLite at {}", options.get_filename().display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let container = Self::new(Arc::new(pool), base_path, name);
        container.migrate().await?;
        Ok(container)
    }

    /// Apply the embedded schema. Every statement is idempotent.
    pub async fn migrate(&self) -> ContainerResult<()> {
        let statements = INIT_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        debug!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }

        Ok(())
    }

    /// Reject keys that could escape the container directory or break paths.
    fn ensure_key_safe(&self, key: &str) -> ContainerResult<()> {
        let invalid = key.is_empty()
            || key.len() > MAX_OBJECT_KEY_LEN
            || key.starts_with('/')
            || key.ends_with('/')
            || key.contains("//")
            || key.contains("..")
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
        if invalid {
            return Err(ContainerError::InvalidObjectKey(key.to_string()));
        }
        Ok(())
    }

    fn container_root(&self) -> PathBuf {
        self.base_path.join(&self.name)
    }

    /// Two-level shard directories from MD5(container/key), as lowercase hex.
    fn object_shards(container: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", container, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn object_path(&self, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(&self.name, key);
        let mut path = self.container_root();
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    async fn fetch_object(&self, key: &str) -> ContainerResult<StoredObject> {
        sqlx::query_as::<_, StoredObject>(
            "SELECT id, container, key, content_type, size_bytes, etag, last_modified
             FROM objects
             WHERE container = ? AND key = ?",
        )
        .bind(&self.name)
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ContainerError::ObjectNotFound {
                container: self.name.clone(),
                key: key.to_string(),
            },
            other => ContainerError::Sqlx(other),
        })
    }

    /// Write `contents` to a temp file beside `file_path`, fsync, then link it
    /// into place. Linking fails instead of overwriting an existing payload.
    async fn write_payload(
        &self,
        key: &str,
        file_path: &Path,
        contents: &[u8],
    ) -> ContainerResult<()> {
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            ContainerError::Io(io::Error::new(
                ErrorKind::Other,
                "object path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let written = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(contents).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::hard_link(&tmp_path, file_path).await
        }
        .await;
        let _ = fs::remove_file(&tmp_path).await;

        match written {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(ContainerError::ObjectAlreadyExists {
                    container: self.name.clone(),
                    key: key.to_string(),
                })
            }
            Err(err) => Err(ContainerError::Io(err)),
        }
    }

    /// Insert the object row and its metadata in one transaction.
    async fn insert_object(
        &self,
        key: &str,
        content_type: &str,
        size_bytes: i64,
        etag: &str,
        metadata: &BTreeMap<String, String>,
    ) -> ContainerResult<StoredObject> {
        let mut tx = self.db.begin().await?;

        let object = sqlx::query_as::<_, StoredObject>(
            r#"
            INSERT INTO objects (id, container, key, content_type, size_bytes, etag, last_modified)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, container, key, content_type, size_bytes, etag, last_modified
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&self.name)
        .bind(key)
        .bind(content_type)
        .bind(size_bytes)
        .bind(etag)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ContainerError::ObjectAlreadyExists {
                    container: self.name.clone(),
                    key: key.to_string(),
                }
            } else {
                ContainerError::Sqlx(err)
            }
        })?;

        for (meta_key, value) in metadata {
            sqlx::query("INSERT INTO object_metadata (object_id, key, value) VALUES (?, ?, ?)")
                .bind(object.id)
                .bind(meta_key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(object)
    }

    async fn check_sqlite(&self) -> Result<(), String> {
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await
        {
            Ok(1) => Ok(()),
            Ok(v) => Err(format!("unexpected result: {}", v)),
            Err(e) => Err(format!("error: {}", e)),
        }
    }

    /// Write, read back and delete a scratch file under `base_path`.
    async fn check_disk(&self) -> Result<(), String> {
        let tmp_path = self.base_path.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&tmp_path, b"readyz")
            .await
            .map_err(|e| format!("could not write tmp file: {}", e))?;

        let read = fs::read(&tmp_path).await;
        let removed = fs::remove_file(&tmp_path).await;
        match read {
            Ok(bytes) if bytes == b"readyz" => {
                removed.map_err(|e| format!("could not remove tmp file: {}", e))
            }
            Ok(_) => Err("file content mismatch".to_string()),
            Err(e) => Err(format!("could not read tmp file: {}", e)),
        }
    }
}

#[async_trait]
impl BlobContainer for LocalContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_object(
        &self,
        key: &str,
        contents: Bytes,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> ContainerResult<StoredObject> {
        self.ensure_key_safe(key)?;
        let start = Instant::now();
        let file_path = self.object_path(key);

        self.write_payload(key, &file_path, &contents).await?;

        let etag = format!("{:x}", md5::compute(&contents));
        let size_bytes = contents.len() as i64;

        match self
            .insert_object(key, content_type, size_bytes, &etag, metadata)
            .await
        {
            Ok(object) => {
                info!(
                    container = %self.name,
                    key = %key,
                    size_bytes,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local container write successful"
                );
                Ok(object)
            }
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(err)
            }
        }
    }

    async fn list_objects(&self) -> ContainerResult<Vec<ListedObject>> {
        // Both reads share one transaction so rows and metadata agree.
        let mut tx = self.db.begin().await?;

        let objects = sqlx::query_as::<_, StoredObject>(
            "SELECT id, container, key, content_type, size_bytes, etag, last_modified
             FROM objects
             WHERE container = ?
             ORDER BY key ASC",
        )
        .bind(&self.name)
        .fetch_all(&mut *tx)
        .await?;

        let entries = sqlx::query_as::<_, ObjectMetadata>(
            "SELECT m.object_id, m.key, m.value
             FROM object_metadata m
             JOIN objects o ON o.id = m.object_id
             WHERE o.container = ?",
        )
        .bind(&self.name)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut by_object: HashMap<Uuid, BTreeMap<String, String>> = HashMap::new();
        for entry in entries {
            by_object
                .entry(entry.object_id)
                .or_default()
                .insert(entry.key, entry.value);
        }

        debug!(container = %self.name, count = objects.len(), "listed objects");

        Ok(objects
            .into_iter()
            .map(|object| ListedObject {
                metadata: by_object.remove(&object.id).unwrap_or_default(),
                object,
            })
            .collect())
    }

    async fn open_object(&self, key: &str) -> ContainerResult<(StoredObject, ObjectReader)> {
        self.ensure_key_safe(key)?;
        let object = self.fetch_object(key).await?;

        let file = File::open(self.object_path(key)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ContainerError::ObjectNotFound {
                    container: self.name.clone(),
                    key: key.to_string(),
                }
            } else {
                ContainerError::Io(err)
            }
        })?;

        let reader: ObjectReader = Box::pin(file);
        Ok((object, reader))
    }

    async fn readiness(&self) -> Vec<ReadinessCheck> {
        vec![
            ReadinessCheck::from_result("sqlite", self.check_sqlite().await),
            ReadinessCheck::from_result("disk", self.check_disk().await),
        ]
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
