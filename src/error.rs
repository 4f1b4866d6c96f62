//! Error types for bucketbench
//!
//! Provides a unified error type for the harness, the reference engine and
//! every backend adapter.

use thiserror::Error;

/// Result type alias using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

/// Unified error type for bucketbench operations
#[derive(Debug, Error)]
pub enum BenchError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Reference Engine Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Backend Adapter Errors
    // -------------------------------------------------------------------------
    #[error("{backend} backend error: {message}")]
    Backend { backend: &'static str, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("no storage found for {name:?}, only [{}] supported", .available.join(","))]
    UnknownStorage { name: String, available: Vec<String> },

    #[error("no operation found for {name:?}, only [{}] supported", .available.join(","))]
    UnknownOperation { name: String, available: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Run Errors
    // -------------------------------------------------------------------------
    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Worker for bucket {bucket} panicked")]
    WorkerPanicked { bucket: usize },
}

impl BenchError {
    /// Wrap a third-party engine error raised by a backend adapter
    pub fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        BenchError::Backend {
            backend,
            message: err.to_string(),
        }
    }

    /// Whether this is an unknown storage/operation name (operator error)
    pub fn is_unknown_name(&self) -> bool {
        matches!(
            self,
            BenchError::UnknownStorage { .. } | BenchError::UnknownOperation { .. }
        )
    }
}
