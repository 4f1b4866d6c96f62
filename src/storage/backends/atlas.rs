//! Reference backend: the in-crate LSM engine
//!
//! The engine has a single flat keyspace, so buckets become a key prefix:
//! `[bucket_len: u16 BE][bucket][key]`. The length makes the prefix exact;
//! scanning `bucket1` never sees `bucket10`.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{BenchError, Result};
use crate::storage::{Storage, Visitor};

pub struct AtlasStorage {
    engine: Engine,
}

impl AtlasStorage {
    pub fn open(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            engine: Engine::open(config)?,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

fn bucket_prefix(bucket: &str) -> Result<Vec<u8>> {
    let len = u16::try_from(bucket.len())
        .map_err(|_| BenchError::backend("atlas", format!("bucket name too long: {} bytes", bucket.len())))?;
    let mut prefix = Vec::with_capacity(2 + bucket.len());
    prefix.extend_from_slice(&len.to_be_bytes());
    prefix.extend_from_slice(bucket.as_bytes());
    Ok(prefix)
}

fn bucket_key(bucket: &str, key: &[u8]) -> Result<Vec<u8>> {
    let mut full = bucket_prefix(bucket)?;
    full.extend_from_slice(key);
    Ok(full)
}

impl Storage for AtlasStorage {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.engine.put(&bucket_key(bucket, key)?, value)
    }

    fn put_if_absent(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.engine
            .put_if_absent(&bucket_key(bucket, key)?, value)
            .map(|_| ())
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.engine.get(&bucket_key(bucket, key)?)
    }

    fn has(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        self.engine.contains(&bucket_key(bucket, key)?)
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        self.engine.delete(&bucket_key(bucket, key)?)
    }

    fn scan(&self, bucket: &str, visit: &mut Visitor<'_>) -> Result<()> {
        let prefix = bucket_prefix(bucket)?;
        let skip = prefix.len();
        self.engine
            .scan_prefix(&prefix, &mut |key, value| visit(&key[skip..], value))
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.engine.close()
    }
}
