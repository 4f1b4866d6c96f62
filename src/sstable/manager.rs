//! Storage Manager
//!
//! Owns the set of sorted tables of one engine instance.
//!
//! ## Responsibilities
//! - Discover existing sorted tables on startup
//! - Search tables newest → oldest for reads
//! - Create new tables from memtable flushes
//! - Merge tables for prefix scans

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::memtable::{Entry, MemTable};

use super::{SSTable, SSTableBuilder, SSTableReader};

/// Manages the on-disk layer
///
/// ## Concurrency:
/// - `sstables`: RwLock, readers share it (reader file cursors have their own mutex)
/// - `next_sstable_id`: atomic counter
pub struct StorageManager {
    data_dir: PathBuf,

    /// Open readers, ordered newest → oldest
    sstables: RwLock<Vec<SSTableReader>>,

    next_sstable_id: AtomicU64,
}

impl StorageManager {
    /// Open or create storage in the given directory, loading existing tables
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                if let Some(id) = Self::parse_sstable_id(&file_path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable_by(|a, b| b.cmp(a));

        let sstables = ids
            .iter()
            .map(|&id| SSTableReader::open(&Self::sstable_path_with_dir(path, id)))
            .collect::<Result<Vec<_>>>()?;

        let next_id = ids.first().map_or(1, |&id| id + 1);
        debug!(dir = %path.display(), tables = sstables.len(), "opened sorted table storage");

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables: RwLock::new(sstables),
            next_sstable_id: AtomicU64::new(next_id),
        })
    }

    /// Newest entry for `key` across all tables (tombstones included)
    pub fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        let sstables = self.sstables.read();
        for reader in sstables.iter() {
            if !reader.might_contain(key) {
                continue;
            }
            if let Some(entry) = reader.get(key)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Merged view of `prefix` across all tables, newest version of each key
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<BTreeMap<Vec<u8>, Entry>> {
        let sstables = self.sstables.read();
        let mut merged = BTreeMap::new();
        // Oldest first so newer tables overwrite
        for reader in sstables.iter().rev() {
            for (key, entry) in reader.scan_prefix(prefix)? {
                merged.insert(key, entry);
            }
        }
        Ok(merged)
    }

    /// Write a memtable into a new table and make it visible to readers
    pub fn flush(&self, memtable: &MemTable) -> Result<SSTable> {
        if memtable.is_empty() {
            return Err(BenchError::Storage("cannot flush empty memtable".to_string()));
        }

        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = self.sstable_path(id);

        let mut builder = SSTableBuilder::new(&path)?;
        for (key, entry) in memtable.iter() {
            builder.add(&key, &entry)?;
        }
        let metadata = builder.finish()?;

        let reader = SSTableReader::open(&path)?;
        self.sstables.write().insert(0, reader);

        debug!(id, entries = metadata.entry_count, bytes = metadata.file_size, "flushed memtable");
        Ok(metadata)
    }

    pub fn sstable_count(&self) -> usize {
        self.sstables.read().len()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    fn sstable_path(&self, id: u64) -> PathBuf {
        Self::sstable_path_with_dir(&self.data_dir, id)
    }

    fn sstable_path_with_dir(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// "sstable_000042.sst" → Some(42)
    fn parse_sstable_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        name.strip_prefix("sstable_")?.parse().ok()
    }
}
