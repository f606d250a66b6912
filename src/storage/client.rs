use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as StoragePath;
use object_store::{ObjectMeta, ObjectStore};
use std::sync::Arc;

use super::{ListPage, ObjectStoreClient, ObjectSummary, Result, StorageError, StoredObject};
use crate::config::{StorageConfig, StorageProvider};

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: "bucketlog-local".to_string(),
        }
    }

    /// Build the client described by a validated storage section
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.provider {
            StorageProvider::Memory => Ok(Self {
                store: Arc::new(InMemory::new()),
                bucket: config.bucket.clone(),
            }),
            StorageProvider::S3 => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);

                // S3-compatible services (MinIO, LocalStack)
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                if let Some(access_key) = &config.access_key_id {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = &config.secret_access_key {
                    builder = builder.with_secret_access_key(secret_key);
                }

                let store = builder
                    .build()
                    .map_err(|e| StorageError::Build(e.to_string()))?;

                tracing::info!(
                    bucket = %config.bucket,
                    region = %config.region,
                    "S3 storage client ready"
                );

                Ok(Self {
                    store: Arc::new(store),
                    bucket: config.bucket.clone(),
                })
            }
        }
    }
}

fn parse_key(key: &str) -> Result<StoragePath> {
    StoragePath::parse(key).map_err(|e| StorageError::InvalidKey {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn summarize(meta: ObjectMeta) -> ObjectSummary {
    ObjectSummary {
        key: meta.location.to_string(),
        size: meta.size,
        last_modified: meta.last_modified,
    }
}

#[async_trait]
impl ObjectStoreClient for StorageClient {
    async fn get(&self, key: &str) -> Result<StoredObject> {
        let path = parse_key(key)?;

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let meta = result.meta.clone();
        let body = result.bytes().await?;

        tracing::debug!(key, size = body.len(), "Downloaded from storage");

        Ok(StoredObject {
            key: key.to_string(),
            size: meta.size,
            last_modified: meta.last_modified,
            body,
        })
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        let path = parse_key(key)?;
        let size = body.len();

        self.store.put(&path, body.into()).await?;

        tracing::debug!(key, size, "Uploaded to storage");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = parse_key(key)?;

        // S3 delete is idempotent; other backends report missing keys
        match self.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let source = parse_key(from)?;
        let destination = parse_key(to)?;

        match self.store.copy(&source, &destination).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(StorageError::NotFound(from.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_page(&self, prefix: &str, after: Option<&str>, limit: usize) -> Result<ListPage> {
        let prefix = match prefix.trim_matches('/') {
            "" => None,
            p => Some(parse_key(p)?),
        };
        let limit = limit.max(1);

        let stream = match after {
            Some(offset) => {
                let offset = parse_key(offset)?;
                self.store.list_with_offset(prefix.as_ref(), &offset)
            }
            None => self.store.list(prefix.as_ref()),
        };

        let metas: Vec<ObjectMeta> = stream.take(limit).try_collect().await?;
        let objects: Vec<ObjectSummary> = metas.into_iter().map(summarize).collect();

        // A full page may be followed by more; the next call settles it.
        let next = if objects.len() == limit {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage { objects, next })
    }
}
