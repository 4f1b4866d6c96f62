//! Measurement and report
//!
//! A routine yields a [`Measurement`]; the driver wraps it with the run's
//! identity into a [`Report`], printed as one tab-separated line.

use std::fmt;
use std::time::Duration;

use crate::config::BenchConfig;

/// What one unit of throughput counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Individual contract calls
    Operations,
    /// Full passes over every bucket
    Scans,
}

/// Timed outcome of one routine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub elapsed: Duration,
    /// Units completed during `elapsed`
    pub count: u64,
    pub unit: Unit,
}

impl Measurement {
    /// `count` individual calls took `elapsed`
    pub fn per_operation(count: u64, elapsed: Duration) -> Self {
        Self {
            elapsed,
            count,
            unit: Unit::Operations,
        }
    }

    /// One scan of all buckets took `elapsed`
    pub fn per_scan(elapsed: Duration) -> Self {
        Self {
            elapsed,
            count: 1,
            unit: Unit::Scans,
        }
    }

    /// Units per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return f64::INFINITY;
        }
        self.count as f64 / secs
    }
}

/// Result of one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub storage: String,
    pub operation: String,
    pub iterations: usize,
    pub buckets: usize,
    pub measurement: Measurement,
}

impl Report {
    pub fn new(config: &BenchConfig, measurement: Measurement) -> Self {
        Self {
            storage: config.storage.clone(),
            operation: config.operation.clone(),
            iterations: config.iterations,
            buckets: config.buckets,
            measurement,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.measurement.elapsed
    }

    pub fn throughput(&self) -> f64 {
        self.measurement.throughput()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.measurement.unit {
            Unit::Operations => "Ops",
            Unit::Scans => "Scans",
        };
        write!(
            f,
            "Storage: {}\tOperation: {}\tIter: {}\tBucket: {}\tElapsed: {:?}\t{}: {:.6}/s",
            self.storage,
            self.operation,
            self.iterations,
            self.buckets,
            self.measurement.elapsed,
            label,
            self.throughput()
        )
    }
}
