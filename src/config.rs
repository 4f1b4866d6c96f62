//! Configuration for bucketbench
//!
//! Two configurations live here:
//! - [`BenchConfig`]: one benchmark run (immutable once the run starts)
//! - [`EngineConfig`]: tuning for the reference "atlas" engine

use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Iterations per bucket when none are given
pub const DEFAULT_ITERATIONS: usize = 100_000;

/// Number of buckets (and workers) when none are given
pub const DEFAULT_BUCKETS: usize = 100;

// =============================================================================
// Run Configuration
// =============================================================================

/// Configuration of a single benchmark run
///
/// Written only before the run starts, then shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Sequential contract calls each worker issues against its bucket
    pub iterations: usize,

    /// Number of buckets, one concurrent worker per bucket
    pub buckets: usize,

    /// Registered backend name
    pub storage: String,

    /// Registered operation name
    pub operation: String,

    /// Directory under which the per-run workspace is created.
    /// `None` means the system temporary directory.
    pub workspace_root: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            buckets: DEFAULT_BUCKETS,
            storage: crate::storage::DEFAULT_STORAGE.to_string(),
            operation: crate::bench::PUT_UNIQUE.to_string(),
            workspace_root: None,
        }
    }
}

impl BenchConfig {
    /// Create a new config builder
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::default()
    }

    /// Reject configurations that cannot produce a throughput number
    pub fn validate(&self) -> Result<()> {
        if self.buckets == 0 {
            return Err(BenchError::Config("bucket count must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(BenchError::Config(
                "iteration count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Total contract calls issued by a per-operation benchmark
    pub fn total_operations(&self) -> u64 {
        self.buckets as u64 * self.iterations as u64
    }

    /// Root directory for the run workspace
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for BenchConfig
#[derive(Default)]
pub struct BenchConfigBuilder {
    config: BenchConfig,
}

impl BenchConfigBuilder {
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    pub fn buckets(mut self, buckets: usize) -> Self {
        self.config.buckets = buckets;
        self
    }

    pub fn storage(mut self, name: impl Into<String>) -> Self {
        self.config.storage = name.into();
        self
    }

    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.config.operation = name.into();
        self
    }

    /// Create run workspaces under this directory instead of the temp dir
    pub fn workspace_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = Some(path.into());
        self
    }

    pub fn build(self) -> BenchConfig {
        self.config
    }
}

// =============================================================================
// Reference Engine Configuration
// =============================================================================

/// Configuration for the reference engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── sstables/        (sorted table files)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// Max size of memtable before flush (in bytes)
    pub memtable_size_limit: usize,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },

    /// Hand records to the OS on every append, fsync only on close
    Never,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./atlas_data"),
            wal_sync_strategy: WalSyncStrategy::Never,
            memtable_size_limit: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl EngineConfig {
    /// Create a new config builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Same tuning, rooted at another directory
    pub fn with_data_dir(&self, path: &Path) -> Self {
        Self {
            data_dir: path.to_path_buf(),
            ..self.clone()
        }
    }
}

/// Builder for EngineConfig
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
