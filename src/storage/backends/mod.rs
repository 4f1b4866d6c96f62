//! Built-in backend adapters
//!
//! Each adapter maps the bucket-aware contract onto one engine's native API.
//! Third-party engines are behind cargo features of the same name.

mod atlas;
mod memory;
#[cfg(feature = "redb")]
mod redb_store;
#[cfg(feature = "sled")]
mod sled_store;

use std::path::Path;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;

use super::{Storage, StorageFactory};

pub use atlas::AtlasStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "redb")]
pub use redb_store::RedbStorage;
#[cfg(feature = "sled")]
pub use sled_store::SledStorage;

pub const ATLAS: &str = "atlas";
pub const MEMORY: &str = "memory";
#[cfg(feature = "sled")]
pub const SLED: &str = "sled";
#[cfg(feature = "redb")]
pub const REDB: &str = "redb";

/// Every compiled-in backend, in registration order
pub fn builtin(engine: EngineConfig) -> Vec<(&'static str, StorageFactory)> {
    let atlas: StorageFactory =
        Arc::new(move |path: &Path| AtlasStorage::open(engine.with_data_dir(path)).map(boxed));
    let memory: StorageFactory =
        Arc::new(|_path: &Path| -> Result<Box<dyn Storage>> { Ok(boxed(MemoryStorage::new())) });

    #[allow(unused_mut)]
    let mut backends = vec![(ATLAS, atlas), (MEMORY, memory)];

    #[cfg(feature = "sled")]
    {
        let sled: StorageFactory = Arc::new(|path: &Path| SledStorage::open(path).map(boxed));
        backends.push((SLED, sled));
    }
    #[cfg(feature = "redb")]
    {
        let redb: StorageFactory = Arc::new(|path: &Path| RedbStorage::open(path).map(boxed));
        backends.push((REDB, redb));
    }
    backends
}

fn boxed<S: Storage + 'static>(storage: S) -> Box<dyn Storage> {
    Box::new(storage)
}
