//! WAL Entry definitions

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Record header: LSN (8) + CRC (4) + payload length (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

/// Borrowed twin of [`WalEntry`]; bincode encodes both identically
#[derive(Serialize)]
struct WalEntryRef<'a> {
    lsn: u64,
    operation: &'a Operation,
    timestamp: u64,
}

impl WalEntry {
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self {
            lsn,
            operation,
            timestamp: now_millis(),
        }
    }

    /// Encode header + payload, ready to append
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_record(self.lsn, &self.operation, self.timestamp)
    }

    /// Decode a payload whose CRC has already been checked
    pub fn decode(payload: &[u8]) -> Result<Self> {
        bincode::deserialize(payload).map_err(|e| BenchError::Serialization(e.to_string()))
    }
}

/// Encode a record without taking ownership of the operation
pub(crate) fn encode_record(lsn: u64, operation: &Operation, timestamp: u64) -> Result<Vec<u8>> {
    let view = WalEntryRef {
        lsn,
        operation,
        timestamp,
    };
    let payload =
        bincode::serialize(&view).map_err(|e| BenchError::Serialization(e.to_string()))?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        BenchError::Serialization(format!("WAL record too large: {} bytes", payload.len()))
    })?;

    let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
    record.extend_from_slice(&lsn.to_le_bytes());
    record.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    record.extend_from_slice(&len.to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
