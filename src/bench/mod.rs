//! Bench Module
//!
//! Everything between "which backend, which operation" and a throughput
//! number.
//!
//! ## Components
//! - [`OperationRegistry`]: operation name → workload routine
//! - `routines`: the workload shapes (puts, conditional puts, scans, lookups)
//! - `workers`: one scoped thread per bucket, fail-fast
//! - [`Workspace`]: the scoped per-run directory
//! - [`Driver`]: resolves, opens, runs, closes, reports

mod driver;
mod report;
mod routines;
mod workers;
mod workspace;

use std::collections::BTreeMap;
use std::fmt;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::storage::Storage;

pub use driver::Driver;
pub use report::{Measurement, Report, Unit};
pub use routines::{preload, put_range};
pub use workers::{run_workers, StopFlag};
pub use workspace::Workspace;

pub const PUT_UNIQUE: &str = "PutUnique";
pub const PUT_DUPLICATE: &str = "PutDuplicate";
pub const PUT_IF: &str = "PutIf";
pub const RANGE: &str = "Range";
pub const HAS: &str = "Has";
pub const DEL: &str = "Del";
pub const GET: &str = "Get";

/// A workload routine: drives every bucket of `config` against `storage`
/// and returns the timed portion of the work.
pub type Routine = fn(&dyn Storage, &BenchConfig) -> Result<Measurement>;

/// Registry of benchmark operations
#[derive(Default, Clone)]
pub struct OperationRegistry {
    routines: BTreeMap<String, Routine>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in operations
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PUT_UNIQUE, routines::put_unique);
        registry.register(PUT_DUPLICATE, routines::put_duplicate);
        registry.register(PUT_IF, routines::put_if);
        registry.register(RANGE, routines::range);
        registry.register(HAS, routines::has);
        registry.register(DEL, routines::del);
        registry.register(GET, routines::get);
        registry
    }

    /// Associate `name` with `routine`; last registration wins
    pub fn register(&mut self, name: impl Into<String>, routine: Routine) {
        self.routines.insert(name.into(), routine);
    }

    pub fn resolve(&self, name: &str) -> Result<Routine> {
        self.routines
            .get(name)
            .copied()
            .ok_or_else(|| BenchError::UnknownOperation {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.routines.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("names", &self.names())
            .finish()
    }
}
