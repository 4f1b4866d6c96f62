//! MemTable Module
//!
//! In-memory data structure for recent writes of the reference engine.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Track approximate size for flush triggers
//! - Ordered iteration for sorted table creation and prefix scans
//!
//! Tombstones are kept so a delete shadows older values in sorted tables.

mod table;

pub use table::MemTable;

/// A versioned slot: either a live value or a deletion marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A live value
    Value(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}

impl Entry {
    /// Bytes this entry contributes to the memtable size estimate
    pub(crate) fn footprint(&self) -> usize {
        match self {
            Entry::Value(v) => v.len(),
            Entry::Tombstone => 0,
        }
    }

    /// The live value, if any
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Tombstone => None,
        }
    }
}
