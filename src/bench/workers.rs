//! Concurrent worker pool
//!
//! One named scoped thread per bucket. Workers never share a bucket. The
//! first failure is kept and raises a stop flag that the other workers poll
//! between calls, so a failed run ends quickly and without a number.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{BenchError, Result};

/// Shared fail-fast state of one worker pool
#[derive(Default)]
pub struct StopFlag {
    stopped: AtomicBool,
    first_error: Mutex<Option<BenchError>>,
}

impl StopFlag {
    /// Whether some worker has failed; callers should return `Ok(())` promptly
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    fn fail(&self, err: BenchError) {
        let mut slot = self.first_error.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.stopped.store(true, Ordering::Relaxed);
    }

    fn into_error(self) -> Option<BenchError> {
        self.first_error.into_inner()
    }
}

/// Run `work(bucket, stop)` for every bucket in `0..buckets` concurrently
///
/// Returns the wall-clock time from just before the first spawn to just
/// after the last join, or the first error any worker raised.
pub fn run_workers<F>(buckets: usize, work: F) -> Result<Duration>
where
    F: Fn(usize, &StopFlag) -> Result<()> + Sync,
{
    let stop = StopFlag::default();

    let start = Instant::now();
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(buckets);
        for bucket in 0..buckets {
            let (work, stop) = (&work, &stop);
            let spawned = thread::Builder::new()
                .name(format!("bucket-{bucket}"))
                .spawn_scoped(scope, move || {
                    if let Err(err) = work(bucket, stop) {
                        stop.fail(err);
                    }
                });
            match spawned {
                Ok(handle) => handles.push((bucket, handle)),
                Err(err) => {
                    stop.fail(err.into());
                    break;
                }
            }
        }

        for (bucket, handle) in handles {
            if handle.join().is_err() {
                stop.fail(BenchError::WorkerPanicked { bucket });
            }
        }
    });
    let elapsed = start.elapsed();

    match stop.into_error() {
        Some(err) => Err(err),
        None => {
            debug!(buckets, ?elapsed, "workers joined");
            Ok(elapsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn every_bucket_runs_once() {
        let seen = Mutex::new(HashSet::new());
        run_workers(16, |bucket, _| {
            assert!(seen.lock().insert(bucket));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.into_inner(), (0..16).collect::<HashSet<_>>());
    }

    #[test]
    fn first_error_is_returned_and_others_stop() {
        let finished = AtomicUsize::new(0);
        let err = run_workers(8, |bucket, stop| {
            if bucket == 3 {
                return Err(BenchError::Verification("bucket 3".into()));
            }
            for _ in 0..10_000 {
                if stop.is_stopped() {
                    return Ok(());
                }
                std::thread::sleep(Duration::from_micros(10));
            }
            finished.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, BenchError::Verification(ref m) if m == "bucket 3"));
        assert!(finished.load(Ordering::Relaxed) < 7);
    }

    #[test]
    fn panicking_worker_is_reported() {
        let err = run_workers(4, |bucket, _| {
            if bucket == 2 {
                panic!("boom");
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, BenchError::WorkerPanicked { bucket: 2 }));
    }
}
