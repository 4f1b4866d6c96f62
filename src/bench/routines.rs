//! Workload routines
//!
//! Each routine spawns one worker per bucket; worker `b` issues
//! `config.iterations` sequential calls against `bucket_name(b)` only.
//!
//! Read, scan and delete benchmarks need keys to exist, so they first run an
//! untimed unique-key put phase over the same indices, then check the
//! outcome of every timed call against it.

use std::time::Duration;

use tracing::debug;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::storage::Storage;
use crate::workload::{bucket_name, key_name, value_name, KeyMode};

use super::workers::run_workers;
use super::Measurement;

/// Put `iterations` values into every bucket, keys chosen by `mode`
pub fn put_range(storage: &dyn Storage, config: &BenchConfig, mode: KeyMode) -> Result<Duration> {
    run_workers(config.buckets, |bucket, stop| {
        let name = bucket_name(bucket);
        for i in 0..config.iterations {
            if stop.is_stopped() {
                return Ok(());
            }
            storage.put(&name, &mode.key(bucket, i), &value_name(bucket, i))?;
        }
        Ok(())
    })
}

/// Untimed unique-key put phase establishing the read/scan/delete precondition
pub fn preload(storage: &dyn Storage, config: &BenchConfig) -> Result<()> {
    let elapsed = put_range(storage, config, KeyMode::Unique)?;
    debug!(?elapsed, keys = config.total_operations(), "preload finished");
    Ok(())
}

pub(super) fn put_unique(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    let elapsed = put_range(storage, config, KeyMode::Unique)?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

pub(super) fn put_duplicate(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    let elapsed = put_range(storage, config, KeyMode::Duplicate)?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

/// Conditional puts on one key per bucket: only the first lands
pub(super) fn put_if(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    let elapsed = run_workers(config.buckets, |bucket, stop| {
        let name = bucket_name(bucket);
        let key = key_name(bucket, 0);
        for i in 0..config.iterations {
            if stop.is_stopped() {
                return Ok(());
            }
            storage.put_if_absent(&name, &key, &value_name(bucket, i))?;
        }
        Ok(())
    })?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

/// One full scan of every bucket, all buckets concurrently
pub(super) fn range(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    preload(storage, config)?;

    let elapsed = run_workers(config.buckets, |bucket, _| {
        let name = bucket_name(bucket);
        let mut visited = 0usize;
        storage.scan(&name, &mut |_, _| {
            visited += 1;
            Ok(())
        })?;
        if visited != config.iterations {
            return Err(BenchError::Verification(format!(
                "scan of {} visited {} entries, expected {}",
                name, visited, config.iterations
            )));
        }
        Ok(())
    })?;
    Ok(Measurement::per_scan(elapsed))
}

pub(super) fn has(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    preload(storage, config)?;

    let elapsed = run_workers(config.buckets, |bucket, stop| {
        let name = bucket_name(bucket);
        for i in 0..config.iterations {
            if stop.is_stopped() {
                return Ok(());
            }
            if !storage.has(&name, &key_name(bucket, i))? {
                return Err(missing_key(&name, i));
            }
        }
        Ok(())
    })?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

pub(super) fn del(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    preload(storage, config)?;

    let elapsed = run_workers(config.buckets, |bucket, stop| {
        let name = bucket_name(bucket);
        for i in 0..config.iterations {
            if stop.is_stopped() {
                return Ok(());
            }
            storage.delete(&name, &key_name(bucket, i))?;
        }
        Ok(())
    })?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

pub(super) fn get(storage: &dyn Storage, config: &BenchConfig) -> Result<Measurement> {
    preload(storage, config)?;

    let elapsed = run_workers(config.buckets, |bucket, stop| {
        let name = bucket_name(bucket);
        for i in 0..config.iterations {
            if stop.is_stopped() {
                return Ok(());
            }
            match storage.get(&name, &key_name(bucket, i))? {
                Some(value) if value == value_name(bucket, i) => {}
                Some(_) => {
                    return Err(BenchError::Verification(format!(
                        "{}: key{} holds an unexpected value",
                        name, i
                    )))
                }
                None => return Err(missing_key(&name, i)),
            }
        }
        Ok(())
    })?;
    Ok(Measurement::per_operation(config.total_operations(), elapsed))
}

fn missing_key(bucket: &str, iteration: usize) -> BenchError {
    BenchError::Verification(format!(
        "{}: key{} missing after preload",
        bucket, iteration
    ))
}
