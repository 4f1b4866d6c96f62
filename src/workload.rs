//! Workload key/value naming
//!
//! Deterministic byte-string identifiers derived from `(bucket, iteration)`.
//! Re-running a configuration regenerates identical bytes, which is what lets
//! the read/scan/delete benchmarks target keys written by an earlier put phase.

/// `"bucket<i>"`
pub fn bucket_name(bucket: usize) -> String {
    format!("bucket{bucket}")
}

/// `"bucket<b>:key<i>"`
pub fn key_name(bucket: usize, iteration: usize) -> Vec<u8> {
    format!("bucket{bucket}:key{iteration}").into_bytes()
}

/// `"bucket<b>:val<i>"`
pub fn value_name(bucket: usize, iteration: usize) -> Vec<u8> {
    format!("bucket{bucket}:val{iteration}").into_bytes()
}

/// How a put workload picks its keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// A fresh key per iteration (the bucket grows)
    Unique,

    /// Key index pinned to 0 while the value still varies (repeated overwrite)
    Duplicate,
}

impl KeyMode {
    /// Key written by `iteration` of `bucket` under this mode
    pub fn key(self, bucket: usize, iteration: usize) -> Vec<u8> {
        match self {
            KeyMode::Unique => key_name(bucket, iteration),
            KeyMode::Duplicate => key_name(bucket, 0),
        }
    }
}
