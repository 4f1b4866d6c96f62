//! Tests for MemTable
//!
//! These tests verify:
//! - Put/get/delete with tombstones
//! - Size tracking used for flush decisions
//! - Sorted snapshots and prefix scans
//! - Concurrent access

use std::sync::Arc;
use std::thread;

use bucketbench::memtable::{Entry, MemTable};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new();

    assert!(memtable.is_empty());
    assert_eq!(memtable.entry_count(), 0);
    assert_eq!(memtable.size(), 0);
}

#[test]
fn test_put_and_get() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());

    assert_eq!(memtable.get(b"key1"), Some(Entry::Value(b"value1".to_vec())));
    assert_eq!(memtable.get(b"missing"), None);
}

#[test]
fn test_delete_creates_tombstone() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());
    memtable.delete(b"key".to_vec());

    assert_eq!(memtable.get(b"key"), Some(Entry::Tombstone));
    assert_eq!(memtable.entry_count(), 1);
}

#[test]
fn test_put_after_delete() {
    let memtable = MemTable::new();

    memtable.delete(b"key".to_vec());
    memtable.put(b"key".to_vec(), b"back".to_vec());

    assert_eq!(memtable.get(b"key"), Some(Entry::Value(b"back".to_vec())));
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_tracking_put() {
    let memtable = MemTable::new();

    let returned = memtable.put(b"key".to_vec(), b"value".to_vec());

    assert_eq!(returned, b"key".len() + b"value".len());
    assert_eq!(memtable.size(), returned);
}

#[test]
fn test_size_tracking_overwrite() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"short".to_vec());
    let size_after_first = memtable.size();
    memtable.put(b"key".to_vec(), b"much_longer_value".to_vec());

    assert_eq!(size_after_first, b"key".len() + b"short".len());
    assert_eq!(memtable.size(), b"key".len() + b"much_longer_value".len());
}

#[test]
fn test_size_tracking_delete() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec());
    memtable.delete(b"key".to_vec());

    assert_eq!(memtable.size(), b"key".len()); // tombstone = just key
}

#[test]
fn test_clear_resets_size() {
    let memtable = MemTable::new();
    memtable.put(b"a".to_vec(), b"1".to_vec());
    memtable.delete(b"b".to_vec());

    memtable.clear();

    assert!(memtable.is_empty());
    assert_eq!(memtable.size(), 0);
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iter_sorted_order_with_tombstones() {
    let memtable = MemTable::new();
    memtable.put(b"c".to_vec(), b"3".to_vec());
    memtable.put(b"a".to_vec(), b"1".to_vec());
    memtable.delete(b"b".to_vec());

    let entries: Vec<_> = memtable.iter().collect();

    assert_eq!(
        entries,
        vec![
            (b"a".to_vec(), Entry::Value(b"1".to_vec())),
            (b"b".to_vec(), Entry::Tombstone),
            (b"c".to_vec(), Entry::Value(b"3".to_vec())),
        ]
    );
}

#[test]
fn test_scan_prefix_bounds() {
    let memtable = MemTable::new();
    for key in ["bucket1:a", "bucket1:b", "bucket10:a", "bucket2:a", "bucket1"] {
        memtable.put(key.as_bytes().to_vec(), b"v".to_vec());
    }

    let keys: Vec<Vec<u8>> = memtable
        .scan_prefix(b"bucket1:")
        .into_iter()
        .map(|(k, _)| k)
        .collect();

    assert_eq!(keys, vec![b"bucket1:a".to_vec(), b"bucket1:b".to_vec()]);
}

#[test]
fn test_scan_prefix_is_snapshot() {
    let memtable = MemTable::new();
    memtable.put(b"p:1".to_vec(), b"v".to_vec());

    let snapshot = memtable.scan_prefix(b"p:");
    memtable.put(b"p:2".to_vec(), b"v".to_vec());

    assert_eq!(snapshot.len(), 1);
    assert_eq!(memtable.scan_prefix(b"p:").len(), 2);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_writes() {
    let memtable = Arc::new(MemTable::new());

    let mut handles = vec![];
    for i in 0..10 {
        let mt = Arc::clone(&memtable);
        handles.push(thread::spawn(move || {
            for j in 0..10 {
                let key = format!("key{}_{}", i, j).into_bytes();
                let value = format!("value{}_{}", i, j).into_bytes();
                mt.put(key, value);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(memtable.entry_count(), 100);
    let expected: usize = (0..10)
        .flat_map(|i| (0..10).map(move |j| format!("key{}_{}value{}_{}", i, j, i, j).len()))
        .sum();
    assert_eq!(memtable.size(), expected);
}
