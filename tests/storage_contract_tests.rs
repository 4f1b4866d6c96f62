//! Contract tests run against every built-in backend
//!
//! These tests verify, for each registered backend:
//! - put/get/has/delete semantics
//! - put_if_absent never overwrites, even under contention
//! - scans see exactly their own bucket
//! - a failing visitor aborts the scan with its error
//! - close releases the instance cleanly

use std::collections::{BTreeMap, HashSet};
use std::thread;

use bucketbench::config::EngineConfig;
use bucketbench::storage::backends;
use bucketbench::{BenchError, Storage, StorageRegistry};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn registry() -> StorageRegistry {
    // Small memtable so the reference engine exercises its on-disk layer too
    StorageRegistry::with_builtin(EngineConfig::builder().memtable_size_limit(4 * 1024).build())
}

/// Run `check` against a fresh instance of every built-in backend
fn for_each_backend(check: impl Fn(&str, &dyn Storage)) {
    let registry = registry();
    assert!(registry.len() >= 2);
    for name in registry.names() {
        let temp = TempDir::new().unwrap();
        let storage = registry.open(&name, temp.path()).unwrap();
        check(&name, storage.as_ref());
        storage.close().unwrap();
    }
}

fn collect(storage: &dyn Storage, bucket: &str) -> BTreeMap<Vec<u8>, Vec<u8>> {
    let mut seen = BTreeMap::new();
    storage
        .scan(bucket, &mut |k, v| {
            assert!(seen.insert(k.to_vec(), v.to_vec()).is_none(), "key visited twice");
            Ok(())
        })
        .unwrap();
    seen
}

// =============================================================================
// Point Operation Tests
// =============================================================================

#[test]
fn test_put_get_has() {
    for_each_backend(|name, s| {
        assert_eq!(s.get("b", b"k").unwrap(), None, "{name}");
        assert!(!s.has("b", b"k").unwrap(), "{name}");

        s.put("b", b"k", b"v1").unwrap();
        assert_eq!(s.get("b", b"k").unwrap(), Some(b"v1".to_vec()), "{name}");
        assert!(s.has("b", b"k").unwrap(), "{name}");

        s.put("b", b"k", b"v2").unwrap();
        assert_eq!(s.get("b", b"k").unwrap(), Some(b"v2".to_vec()), "{name}");
    });
}

#[test]
fn test_same_key_different_buckets() {
    for_each_backend(|name, s| {
        s.put("left", b"k", b"L").unwrap();
        s.put("right", b"k", b"R").unwrap();

        assert_eq!(s.get("left", b"k").unwrap(), Some(b"L".to_vec()), "{name}");
        assert_eq!(s.get("right", b"k").unwrap(), Some(b"R".to_vec()), "{name}");
        assert!(!s.has("middle", b"k").unwrap(), "{name}");
    });
}

#[test]
fn test_delete() {
    for_each_backend(|name, s| {
        s.put("b", b"k", b"v").unwrap();
        s.delete("b", b"k").unwrap();

        assert_eq!(s.get("b", b"k").unwrap(), None, "{name}");
        assert!(!s.has("b", b"k").unwrap(), "{name}");

        // Absent key and never-written bucket are both fine
        s.delete("b", b"k").unwrap();
        s.delete("nowhere", b"k").unwrap();
    });
}

#[test]
fn test_put_if_absent_does_not_overwrite() {
    for_each_backend(|name, s| {
        s.put_if_absent("b", b"k", b"first").unwrap();
        s.put_if_absent("b", b"k", b"second").unwrap();

        assert_eq!(s.get("b", b"k").unwrap(), Some(b"first".to_vec()), "{name}");

        s.delete("b", b"k").unwrap();
        s.put_if_absent("b", b"k", b"third").unwrap();
        assert_eq!(s.get("b", b"k").unwrap(), Some(b"third".to_vec()), "{name}");
    });
}

#[test]
fn test_put_if_absent_single_winner_under_contention() {
    for_each_backend(|name, s| {
        let candidates: Vec<Vec<u8>> = (0..8).map(|t| format!("writer{t}").into_bytes()).collect();

        thread::scope(|scope| {
            for value in &candidates {
                scope.spawn(move || {
                    for _ in 0..20 {
                        s.put_if_absent("b", b"contended", value).unwrap();
                    }
                });
            }
        });

        let stored = s.get("b", b"contended").unwrap().unwrap();
        assert!(candidates.contains(&stored), "{name}");
        assert_eq!(collect(s, "b").len(), 1, "{name}");
    });
}

#[test]
fn test_empty_value_is_present() {
    for_each_backend(|name, s| {
        s.put("b", b"k", b"").unwrap();

        assert_eq!(s.get("b", b"k").unwrap(), Some(Vec::new()), "{name}");
        assert!(s.has("b", b"k").unwrap(), "{name}");
    });
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_visits_each_live_entry_once() {
    for_each_backend(|name, s| {
        for i in 0..200 {
            s.put("b", format!("key{i}").as_bytes(), format!("val{i}").as_bytes())
                .unwrap();
        }
        for i in 0..50 {
            s.delete("b", format!("key{i}").as_bytes()).unwrap();
        }
        s.put("b", b"key199", b"updated").unwrap();

        let seen = collect(s, "b");

        assert_eq!(seen.len(), 150, "{name}");
        assert_eq!(seen.get(b"key199".as_slice()), Some(&b"updated".to_vec()), "{name}");
        assert!(!seen.contains_key(b"key0".as_slice()), "{name}");
    });
}

#[test]
fn test_scan_bucket_isolation() {
    for_each_backend(|name, s| {
        // Names that are prefixes of each other must not leak into one another
        s.put("bucket1", b"a", b"1").unwrap();
        s.put("bucket10", b"a", b"10").unwrap();
        s.put("bucket1", b"b", b"1").unwrap();
        s.put("bucket", b"1a", b"none").unwrap();

        let keys: HashSet<Vec<u8>> = collect(s, "bucket1").into_keys().collect();

        assert_eq!(keys, HashSet::from([b"a".to_vec(), b"b".to_vec()]), "{name}");
        assert_eq!(collect(s, "bucket10").len(), 1, "{name}");
        assert_eq!(collect(s, "bucket").len(), 1, "{name}");
    });
}

#[test]
fn test_scan_unknown_bucket_is_empty() {
    for_each_backend(|name, s| {
        s.put("present", b"k", b"v").unwrap();

        assert!(collect(s, "absent").is_empty(), "{name}");
    });
}

#[test]
fn test_scan_visitor_error_propagates() {
    for_each_backend(|name, s| {
        for i in 0..10 {
            s.put("b", format!("k{i}").as_bytes(), b"v").unwrap();
        }

        let mut visited = 0;
        let result = s.scan("b", &mut |_, _| {
            visited += 1;
            Err(BenchError::Verification("stop here".into()))
        });

        assert!(matches!(result, Err(BenchError::Verification(_))), "{name}");
        assert_eq!(visited, 1, "{name}");
    });
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_builtin_registration_order_and_names() {
    let names = registry().names();

    assert!(names.contains(&backends::ATLAS.to_string()));
    assert!(names.contains(&backends::MEMORY.to_string()));
    #[cfg(feature = "sled")]
    assert!(names.contains(&backends::SLED.to_string()));
    #[cfg(feature = "redb")]
    assert!(names.contains(&backends::REDB.to_string()));
}

#[test]
fn test_atlas_data_survives_close() {
    let registry = registry();
    let temp = TempDir::new().unwrap();

    let storage = registry.open(backends::ATLAS, temp.path()).unwrap();
    for i in 0..100 {
        storage
            .put("bucket3", format!("key{i}").as_bytes(), b"v")
            .unwrap();
    }
    storage.close().unwrap();

    let storage = registry.open(backends::ATLAS, temp.path()).unwrap();
    assert_eq!(collect(storage.as_ref(), "bucket3").len(), 100);
    storage.close().unwrap();
}

#[cfg(feature = "redb")]
#[test]
fn test_redb_data_survives_close() {
    let registry = registry();
    let temp = TempDir::new().unwrap();

    let storage = registry.open(backends::REDB, temp.path()).unwrap();
    storage.put("b", b"k", b"v").unwrap();
    storage.close().unwrap();

    let storage = registry.open(backends::REDB, temp.path()).unwrap();
    assert_eq!(storage.get("b", b"k").unwrap(), Some(b"v".to_vec()));
    storage.close().unwrap();
}
