//! Object storage capability used by the exporter and the retention sweep.
//!
//! [`ObjectStoreClient`] is the narrow seam the core talks to. [`StorageClient`]
//! implements it on top of the `object_store` crate so the same code runs
//! against S3 (or any S3-compatible endpoint) and the in-memory backend.

mod client;

pub use client::StorageClient;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Failed to build object store client: {0}")]
    Build(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_)
                | StorageError::ObjectStoreError(object_store::Error::NotFound { .. })
        )
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Snapshot of an object read in full
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub body: Bytes,
}

/// Listing entry (no body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// One page of a listing. `next` is the key to resume after, `None` once the
/// listing is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    pub next: Option<String>,
}

/// Bucket-scoped object operations
///
/// Implementations are bound to one bucket at construction; keys are
/// `/`-separated paths without a leading separator.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Read an object. Returns [`StorageError::NotFound`] when absent.
    async fn get(&self, key: &str) -> Result<StoredObject>;

    /// Create or overwrite an object
    async fn put(&self, key: &str, body: Bytes) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Server-side copy; overwrites `to` if it exists
    async fn copy(&self, from: &str, to: &str) -> Result<()>;

    /// List up to `limit` objects under `prefix` in key order, starting
    /// strictly after `after` when given. An empty prefix lists the bucket.
    async fn list_page(&self, prefix: &str, after: Option<&str>, limit: usize) -> Result<ListPage>;
}

/// Drain every page under `prefix`, optionally starting after a key
pub async fn list_all(
    store: &dyn ObjectStoreClient,
    prefix: &str,
    start_after: Option<&str>,
    page_size: usize,
) -> Result<Vec<ObjectSummary>> {
    let mut objects = Vec::new();
    let mut after: Option<String> = start_after.map(str::to_string);

    loop {
        let page = store.list_page(prefix, after.as_deref(), page_size).await?;
        objects.extend(page.objects);

        match page.next {
            Some(next) => after = Some(next),
            None => break,
        }
    }

    Ok(objects)
}
