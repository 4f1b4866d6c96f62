//! Storage Module
//!
//! The contract every benchmarked backend implements, and the registry that
//! maps backend names to factories.
//!
//! ## Contract
//! | Call            | Semantics                                                   |
//! |-----------------|-------------------------------------------------------------|
//! | `put`           | unconditional upsert                                        |
//! | `put_if_absent` | upsert only if absent; atomic w.r.t. same-key callers       |
//! | `get`           | `None` when absent                                          |
//! | `has`           | agrees with `get`                                           |
//! | `delete`        | removing an absent key is not an error                      |
//! | `scan`          | each live entry of the bucket exactly once, any order       |
//! | `close`         | release everything; called exactly once                     |
//!
//! There is no transaction or batch primitive. Backends with native
//! transactions wrap each call in its own.

pub mod backends;
mod registry;

pub use registry::{StorageFactory, StorageRegistry};

use crate::error::Result;

/// Name of the reference backend, used when none is requested
pub const DEFAULT_STORAGE: &str = backends::ATLAS;

/// Callback handed to [`Storage::scan`]. Returning an error aborts the scan
/// and becomes its result.
pub type Visitor<'a> = dyn FnMut(&[u8], &[u8]) -> Result<()> + 'a;

/// Uniform interface for a key-value store under benchmark
///
/// One instance is shared by every worker of a run, hence `Send + Sync`.
pub trait Storage: Send + Sync {
    /// Create or overwrite `key` in `bucket`
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Write `key` only if it does not exist yet; otherwise a no-op
    fn put_if_absent(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Most recent value of `key`, or `None`
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Existence check
    fn has(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get(bucket, key)?.is_some())
    }

    /// Remove `key` if present
    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()>;

    /// Visit every live `(key, value)` of `bucket`
    fn scan(&self, bucket: &str, visit: &mut Visitor<'_>) -> Result<()>;

    /// Release all resources held by the instance
    fn close(self: Box<Self>) -> Result<()>;
}
