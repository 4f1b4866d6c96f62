//! # bucketbench
//!
//! A pluggable throughput benchmark for key-value storage backends:
//! - A minimal storage contract (put, put-if-absent, get, has, delete, scan)
//! - Explicit registries for backends and benchmark operations
//! - One concurrent worker per bucket, fail-fast on the first error
//! - A reference LSM engine ("atlas") plus in-memory, sled and redb adapters
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CLI (bucketbench)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ BenchConfig
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Driver                                 │
//! │     StorageRegistry  ·  OperationRegistry  ·  Workspace      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one worker per bucket
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 dyn Storage (contract)                       │
//! └──────┬──────────────┬──────────────┬──────────────┬─────────┘
//!        ▼              ▼              ▼              ▼
//!   ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │  atlas  │   │  memory  │   │   sled   │   │   redb   │
//!   │WAL/Mem/ │   └──────────┘   └──────────┘   └──────────┘
//!   │ SSTable │
//!   └─────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod workload;

pub mod engine;
pub mod memtable;
pub mod sstable;
pub mod wal;

pub mod bench;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use bench::{Driver, OperationRegistry, Report};
pub use config::{BenchConfig, EngineConfig};
pub use engine::Engine;
pub use error::{BenchError, Result};
pub use storage::{Storage, StorageRegistry};

/// Current version of bucketbench
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
