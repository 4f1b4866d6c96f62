//! Engine Module
//!
//! The reference storage engine behind the "atlas" backend.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and sorted tables
//! - Handle concurrent read/write access
//! - Trigger flushes when the MemTable is full
//! - Replay the WAL on startup

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::memtable::{Entry, MemTable};
use crate::sstable::StorageManager;
use crate::wal::{Operation, WalRecovery, WalWriter};

/// The reference storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (put/put_if_absent/delete/flush): serialized by `write_lock`,
///   acquired in the order write_lock → WAL → memtable → storage
/// - **Reads** (get/scan_prefix): no write_lock; the memtable and the sorted
///   table list each use an internal RwLock
pub struct Engine {
    config: EngineConfig,

    /// Directory holding the sorted tables
    storage_dir: PathBuf,

    wal: Mutex<WalWriter>,

    memtable: MemTable,

    storage: StorageManager,

    /// Serializes write operations
    write_lock: Mutex<()>,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";
    const SSTABLE_DIR: &'static str = "sstables";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load existing sorted tables
    /// 3. Replay the WAL if one exists, flushing what it held
    /// 4. Start a fresh WAL
    pub fn open(config: EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let storage_dir = config.data_dir.join(Self::SSTABLE_DIR);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage = StorageManager::open(&storage_dir)?;
        let memtable = MemTable::new();

        let mut next_lsn = 1;
        if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                info!(
                    recovered = recovery.entries_recovered,
                    corrupted = recovery.entries_corrupted,
                    last_lsn = recovery.last_lsn,
                    "WAL recovery"
                );
            }

            for entry in entries {
                match entry.operation {
                    Operation::Put { key, value } => {
                        memtable.put(key, value);
                    }
                    Operation::Delete { key } => {
                        memtable.delete(key);
                    }
                }
            }

            // Recovered data must be durable in a sorted table before the WAL is reset
            if !memtable.is_empty() {
                debug!(entries = memtable.entry_count(), "flushing recovered entries");
                storage.flush(&memtable)?;
                memtable.clear();
            }
            next_lsn = recovery.last_lsn + 1;
        }

        let wal = WalWriter::open_at(&wal_path, config.wal_sync_strategy, next_lsn)?;

        Ok(Self {
            config,
            storage_dir,
            wal: Mutex::new(wal),
            memtable,
            storage,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with default tuning rooted at `path`
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(EngineConfig::default().with_data_dir(path))
    }

    /// Get a value by key
    ///
    /// Search order: MemTable, then sorted tables newest to oldest.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.lookup(key)?.and_then(Entry::into_value))
    }

    /// Whether a live value exists for `key`
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(matches!(self.lookup(key)?, Some(Entry::Value(_))))
    }

    fn lookup(&self, key: &[u8]) -> Result<Option<Entry>> {
        if let Some(entry) = self.memtable.get(key) {
            return Ok(Some(entry));
        }
        // A flush publishes its table before clearing the memtable, so a
        // memtable miss here is always covered by the sorted tables.
        self.storage.get(key)
    }

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.apply(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }

    /// Put only if no live value exists. Returns whether the value was written.
    ///
    /// The check and the write happen under the write lock, so two callers
    /// racing on the same key cannot both insert.
    pub fn put_if_absent(&self, key: &[u8], value: &[u8]) -> Result<bool> {
        let _write_guard = self.write_lock.lock();
        if self.contains(key)? {
            return Ok(false);
        }
        self.apply(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        Ok(true)
    }

    /// Delete a key (writes a tombstone; deleting an absent key is fine)
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.apply(Operation::Delete { key: key.to_vec() })
    }

    /// Visit every live entry whose key starts with `prefix`, in key order
    ///
    /// The visitor may stop the scan by returning an error, which becomes the
    /// scan's result.
    pub fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        // Memtable before tables: a flush racing with us then shows up twice
        // (same data) instead of not at all.
        let recent = self.memtable.scan_prefix(prefix);
        let mut merged = self.storage.scan_prefix(prefix)?;
        merged.extend(recent);

        for (key, entry) in &merged {
            if let Entry::Value(value) = entry {
                visit(key, value)?;
            }
        }
        Ok(())
    }

    /// Append to the WAL, apply to the memtable, flush if over the limit.
    /// Caller holds `write_lock`.
    fn apply(&self, operation: Operation) -> Result<()> {
        self.wal.lock().append(&operation)?;
        let new_size = match operation {
            Operation::Put { key, value } => self.memtable.put(key, value),
            Operation::Delete { key } => self.memtable.delete(key),
        };

        if new_size >= self.config.memtable_size_limit {
            self.flush_internal()?;
        }
        Ok(())
    }

    /// Flush memtable to disk regardless of its size
    pub fn flush(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.flush_internal()
    }

    /// Caller holds `write_lock`
    fn flush_internal(&self) -> Result<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        self.storage.flush(&self.memtable)?;
        self.memtable.clear();
        // Entries are durable in the new table
        self.wal.lock().truncate()?;

        Ok(())
    }

    /// Close the engine: flush pending data and sync the WAL
    pub fn close(self) -> Result<()> {
        self.flush()?;
        self.wal.lock().sync()?;
        debug!(dir = %self.config.data_dir.display(), tables = self.storage.sstable_count(), "engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
