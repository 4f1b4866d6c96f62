//! In-memory backend: one ordered map per bucket
//!
//! Nothing touches the filesystem; useful as a baseline for harness overhead.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::{Storage, Visitor};

type Bucket = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

#[derive(Default)]
pub struct MemoryStorage {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing bucket, if any (reads never create buckets)
    fn bucket(&self, name: &str) -> Option<Bucket> {
        self.buckets.read().get(name).cloned()
    }

    fn bucket_or_create(&self, name: &str) -> Bucket {
        if let Some(bucket) = self.bucket(name) {
            return bucket;
        }
        self.buckets
            .write()
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

impl Storage for MemoryStorage {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.bucket_or_create(bucket)
            .write()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn put_if_absent(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.bucket_or_create(bucket)
            .write()
            .entry(key.to_vec())
            .or_insert_with(|| value.to_vec());
        Ok(())
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .bucket(bucket)
            .and_then(|b| b.read().get(key).cloned()))
    }

    fn has(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        Ok(self
            .bucket(bucket)
            .is_some_and(|b| b.read().contains_key(key)))
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        if let Some(b) = self.bucket(bucket) {
            b.write().remove(key);
        }
        Ok(())
    }

    fn scan(&self, bucket: &str, visit: &mut Visitor<'_>) -> Result<()> {
        let Some(b) = self.bucket(bucket) else {
            return Ok(());
        };
        let entries = b.read();
        for (key, value) in entries.iter() {
            visit(key, value)?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
