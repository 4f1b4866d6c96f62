//! Backend registry
//!
//! Name → factory mapping, built explicitly at startup and handed to the
//! driver by reference.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{BenchError, Result};

use super::{backends, Storage};

/// Opens a backend instance rooted at a directory
pub type StorageFactory = Arc<dyn Fn(&Path) -> Result<Box<dyn Storage>> + Send + Sync>;

/// Registry of available storage backends
#[derive(Default, Clone)]
pub struct StorageRegistry {
    factories: BTreeMap<String, StorageFactory>,
}

impl StorageRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every backend compiled into this binary,
    /// registered in [`backends::builtin`] order
    pub fn with_builtin(engine: EngineConfig) -> Self {
        let mut registry = Self::new();
        for (name, factory) in backends::builtin(engine) {
            registry.insert(name, factory);
        }
        registry
    }

    /// Associate `name` with `factory`. Registering a name again replaces the
    /// earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Path) -> Result<Box<dyn Storage>> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(factory));
    }

    fn insert(&mut self, name: impl Into<String>, factory: StorageFactory) {
        let name = name.into();
        if self.factories.insert(name.clone(), factory).is_some() {
            debug!(storage = %name, "replaced registered storage factory");
        }
    }

    /// Look up the factory for `name`
    pub fn resolve(&self, name: &str) -> Result<StorageFactory> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| BenchError::UnknownStorage {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Resolve `name` and open an instance at `path`
    pub fn open(&self, name: &str, path: &Path) -> Result<Box<dyn Storage>> {
        let factory = self.resolve(name)?;
        factory(path)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageRegistry")
            .field("names", &self.names())
            .finish()
    }
}
