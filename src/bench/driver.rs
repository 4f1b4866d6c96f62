//! Benchmark driver
//!
//! One run: `Configured → WorkspaceAcquired → BackendOpened → WorkersRunning
//! → Aggregated → WorkspaceReleased`. Names are resolved before anything is
//! created, so a typo leaves no trace on disk.

use tracing::{info, warn};

use crate::config::BenchConfig;
use crate::error::Result;
use crate::storage::StorageRegistry;

use super::{OperationRegistry, Report, Workspace};

/// Runs benchmarks against the backends and operations it was given
pub struct Driver<'a> {
    storages: &'a StorageRegistry,
    operations: &'a OperationRegistry,
}

impl<'a> Driver<'a> {
    pub fn new(storages: &'a StorageRegistry, operations: &'a OperationRegistry) -> Self {
        Self {
            storages,
            operations,
        }
    }

    /// Execute one run and report its throughput
    ///
    /// Any failure (open, close, or any single contract call) fails the whole
    /// run; there is no partial report.
    pub fn run(&self, config: &BenchConfig) -> Result<Report> {
        config.validate()?;
        let factory = self.storages.resolve(&config.storage)?;
        let routine = self.operations.resolve(&config.operation)?;

        let workspace = Workspace::acquire(&config.workspace_root())?;
        let storage = factory(workspace.path())?;
        info!(
            storage = %config.storage,
            operation = %config.operation,
            iterations = config.iterations,
            buckets = config.buckets,
            "starting run"
        );

        let outcome = routine(storage.as_ref(), config);
        let closed = storage.close();

        let measurement = match (outcome, closed) {
            (Ok(measurement), Ok(())) => measurement,
            (Ok(_), Err(err)) => return Err(err),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "close failed after an earlier run failure");
                return Err(err);
            }
        };

        workspace.release()?;

        let report = Report::new(config, measurement);
        info!(
            elapsed = ?report.elapsed(),
            throughput = report.throughput(),
            "run finished"
        );
        Ok(report)
    }
}
