//! MemTable implementation
//!
//! BTreeMap-based memtable behind a parking_lot RwLock.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::Entry;

/// In-memory table for recent writes
///
/// All methods take `&self`; readers share the lock, writers take it exclusively.
pub struct MemTable {
    data: RwLock<BTreeMap<Vec<u8>, Entry>>,
    /// Approximate size in bytes (keys + live values)
    size: AtomicUsize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Look up a key; a tombstone is returned as such, not as absence
    pub fn get(&self, key: &[u8]) -> Option<Entry> {
        self.data.read().get(key).cloned()
    }

    /// Insert or overwrite a value. Returns the new approximate size.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> usize {
        self.insert(key, Entry::Value(value))
    }

    /// Record a tombstone. Returns the new approximate size.
    pub fn delete(&self, key: Vec<u8>) -> usize {
        self.insert(key, Entry::Tombstone)
    }

    fn insert(&self, key: Vec<u8>, entry: Entry) -> usize {
        let key_len = key.len();
        let added = entry.footprint();
        let mut data = self.data.write();
        // Writers hold the lock, so the load/store pair cannot interleave.
        let current = self.size.load(Ordering::Relaxed);
        let new_size = match data.insert(key, entry) {
            Some(old) => current - old.footprint() + added,
            None => current + key_len + added,
        };
        self.size.store(new_size, Ordering::Relaxed);
        new_size
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Number of entries, tombstones included
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Snapshot of all entries in sorted key order (used by flush)
    pub fn iter(&self) -> std::vec::IntoIter<(Vec<u8>, Entry)> {
        let data = self.data.read();
        data.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Snapshot of the entries whose key starts with `prefix`, sorted
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Entry)> {
        let data = self.data.read();
        data.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Drop all entries (after a successful flush)
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
        self.size.store(0, Ordering::Relaxed);
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
