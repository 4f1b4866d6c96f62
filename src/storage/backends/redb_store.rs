//! redb backend
//!
//! One redb table per bucket; every contract call runs in its own
//! transaction. redb admits a single write transaction at a time, so writers
//! from different buckets queue on it.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError};
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::storage::{Storage, Visitor};

const BACKEND: &str = "redb";

pub struct RedbStorage {
    db: Database,
}

fn redb_err(err: impl Into<redb::Error>) -> BenchError {
    BenchError::backend(BACKEND, err.into())
}

fn table(bucket: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(bucket)
}

impl RedbStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let file = path.join("redb.db");
        let db = Database::create(&file).map_err(redb_err)?;
        debug!(path = %file.display(), "opened redb");
        Ok(Self { db })
    }
}

impl Storage for RedbStorage {
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().map_err(redb_err)?;
        {
            let mut t = txn.open_table(table(bucket)).map_err(redb_err)?;
            t.insert(key, value).map_err(redb_err)?;
        }
        txn.commit().map_err(redb_err)
    }

    fn put_if_absent(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        // The write transaction is exclusive, so check-then-insert is atomic
        let txn = self.db.begin_write().map_err(redb_err)?;
        {
            let mut t = txn.open_table(table(bucket)).map_err(redb_err)?;
            let exists = t.get(key).map_err(redb_err)?.is_some();
            if !exists {
                t.insert(key, value).map_err(redb_err)?;
            }
        }
        txn.commit().map_err(redb_err)
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(redb_err)?;
        let t = match txn.open_table(table(bucket)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb_err(e)),
        };
        let value = t.get(key).map_err(redb_err)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().map_err(redb_err)?;
        {
            let mut t = txn.open_table(table(bucket)).map_err(redb_err)?;
            t.remove(key).map_err(redb_err)?;
        }
        txn.commit().map_err(redb_err)
    }

    fn scan(&self, bucket: &str, visit: &mut Visitor<'_>) -> Result<()> {
        let txn = self.db.begin_read().map_err(redb_err)?;
        let t = match txn.open_table(table(bucket)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(()),
            Err(e) => return Err(redb_err(e)),
        };
        for item in t.iter().map_err(redb_err)? {
            let (key, value) = item.map_err(redb_err)?;
            visit(key.value(), value.value())?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        drop(self.db);
        Ok(())
    }
}
