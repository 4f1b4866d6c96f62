//! sled backend
//!
//! One sled `Tree` per bucket. Trees are opened lazily and cached, since
//! `open_tree` takes sled's internal metadata lock.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::storage::{Storage, Visitor};

const BACKEND: &str = "sled";

pub struct SledStorage {
    db: sled::Db,
    trees: RwLock<HashMap<String, sled::Tree>>,
}

fn sled_err(err: sled::Error) -> BenchError {
    BenchError::backend(BACKEND, err)
}

impl SledStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::Config::default()
            .path(path.join("sled"))
            .mode(sled::Mode::HighThroughput)
            .open()
            .map_err(sled_err)?;
        debug!(path = %path.display(), "opened sled");
        Ok(Self {
            db,
            trees: RwLock::new(HashMap::new()),
        })
    }

    fn tree(&self, bucket: &str) -> Result<sled::Tree> {
        if let Some(tree) = self.trees.read().get(bucket) {
            return Ok(tree.clone());
        }
        let mut trees = self.trees.write();
        if let Some(tree) = trees.get(bucket) {
            return Ok(tree.clone());
        }
        let tree = self.db.open_tree(bucket).map_err(sled_err)?;
        trees.insert(bucket.to_string(), tree.clone());
        Ok(tree)
    }
}

impl Storage for SledStorage {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.tree(bucket)?.insert(key, value).map_err(sled_err)?;
        Ok(())
    }

    fn put_if_absent(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        // An inner Err means the key already exists, which is a no-op here
        let _ = self
            .tree(bucket)?
            .compare_and_swap(key, None::<&[u8]>, Some(value))
            .map_err(sled_err)?;
        Ok(())
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self.tree(bucket)?.get(key).map_err(sled_err)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn has(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        self.tree(bucket)?.contains_key(key).map_err(sled_err)
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        self.tree(bucket)?.remove(key).map_err(sled_err)?;
        Ok(())
    }

    fn scan(&self, bucket: &str, visit: &mut Visitor<'_>) -> Result<()> {
        for item in self.tree(bucket)?.iter() {
            let (key, value) = item.map_err(sled_err)?;
            visit(&key, &value)?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.db.flush().map_err(sled_err)?;
        Ok(())
    }
}
