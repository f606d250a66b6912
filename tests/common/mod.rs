//! Scriptable in-process bucket for exercising the exporter and the sweeper
//! with controlled timestamps and injected failures.

#![allow(dead_code)]

use async_trait::async_trait;
use bucketlog::storage::{
    ListPage, ObjectStoreClient, ObjectSummary, Result, StorageError, StoredObject,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Put,
    Delete,
    Copy,
    List,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub body: Bytes,
    pub last_modified: DateTime<Utc>,
}

type Hook = Box<dyn FnOnce(&mut BTreeMap<String, Entry>) + Send>;

pub struct FakeStore {
    objects: Mutex<BTreeMap<String, Entry>>,
    now: Mutex<DateTime<Utc>>,
    calls: Mutex<Vec<(Op, String)>>,
    failures: Mutex<Vec<(Op, String)>>,
    failing_ops: Mutex<Vec<Op>>,
    after_get: Mutex<Option<Hook>>,
}

impl FakeStore {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            now: Mutex::new(now),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            failing_ops: Mutex::new(Vec::new()),
            after_get: Mutex::new(None),
        }
    }

    /// Timestamp stamped on subsequent writes
    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn insert(&self, key: &str, body: &str, last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            Entry {
                body: Bytes::copy_from_slice(body.as_bytes()),
                last_modified,
            },
        );
    }

    pub fn body(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|entry| String::from_utf8_lossy(&entry.body).into_owned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Make every `op` on `key` fail (for listings, `key` is the prefix)
    pub fn fail(&self, op: Op, key: &str) {
        self.failures.lock().unwrap().push((op, key.to_string()));
    }

    /// Make every `op` fail, whatever the key
    pub fn fail_all(&self, op: Op) {
        self.failing_ops.lock().unwrap().push(op);
    }

    /// Run `hook` against the stored objects right after the next `get`
    /// returns, simulating another writer acting in between.
    pub fn after_next_get(&self, hook: impl FnOnce(&mut BTreeMap<String, Entry>) + Send + 'static) {
        *self.after_get.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: Op, key: &str) -> Result<()> {
        self.calls.lock().unwrap().push((op, key.to_string()));

        let failing = self.failing_ops.lock().unwrap().contains(&op)
            || self
                .failures
                .lock()
                .unwrap()
                .iter()
                .any(|(o, k)| *o == op && k == key);

        if failing {
            return Err(StorageError::ObjectStoreError(object_store::Error::Generic {
                store: "fake",
                source: format!("injected {op:?} failure on {key}").into(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStoreClient for FakeStore {
    async fn get(&self, key: &str) -> Result<StoredObject> {
        self.record(Op::Get, key)?;

        let entry = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        if let Some(hook) = self.after_get.lock().unwrap().take() {
            let mut objects = self.objects.lock().unwrap();
            hook(&mut *objects);
        }

        Ok(StoredObject {
            key: key.to_string(),
            size: entry.body.len() as u64,
            last_modified: entry.last_modified,
            body: entry.body,
        })
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        self.record(Op::Put, key)?;
        let last_modified = *self.now.lock().unwrap();
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Entry { body, last_modified });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.record(Op::Delete, key)?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        self.record(Op::Copy, from)?;
        let mut objects = self.objects.lock().unwrap();
        let mut entry = objects
            .get(from)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        entry.last_modified = *self.now.lock().unwrap();
        objects.insert(to.to_string(), entry);
        Ok(())
    }

    async fn list_page(&self, prefix: &str, after: Option<&str>, limit: usize) -> Result<ListPage> {
        self.record(Op::List, prefix)?;

        let prefix = prefix.trim_matches('/');
        let dir = format!("{prefix}/");
        let objects: Vec<ObjectSummary> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| prefix.is_empty() || key.starts_with(&dir))
            .filter(|(key, _)| after.is_none_or(|a| key.as_str() > a))
            .take(limit)
            .map(|(key, entry)| ObjectSummary {
                key: key.clone(),
                size: entry.body.len() as u64,
                last_modified: entry.last_modified,
            })
            .collect();

        let next = if objects.len() == limit {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage { objects, next })
    }
}
