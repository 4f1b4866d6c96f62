//! Sorted table builder
//!
//! Streams entries (in ascending key order) into a new file, then appends the
//! index and footer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::memtable::Entry;

use super::{SSTable, HEADER_SIZE, MAGIC, TOMBSTONE_MARKER, VERSION};

/// Builder for creating new sorted tables from sorted entries
pub struct SSTableBuilder {
    path: PathBuf,
    writer: BufWriter<File>,
    entry_count: u64,
    /// Offset the next entry will be written at
    offset: u64,
    /// key → file offset of its entry
    index: Vec<(Vec<u8>, u64)>,
    crc: crc32fast::Hasher,
}

impl SSTableBuilder {
    /// Create the file and write a provisional header
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?; // count, patched in finish()

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            entry_count: 0,
            offset: HEADER_SIZE,
            index: Vec::new(),
            crc: crc32fast::Hasher::new(),
        })
    }

    /// Append an entry. Keys must arrive strictly ascending.
    pub fn add(&mut self, key: &[u8], entry: &Entry) -> Result<()> {
        if let Some((last, _)) = self.index.last() {
            if key <= last.as_slice() {
                return Err(BenchError::Storage(format!(
                    "sorted table keys out of order: {:?} after {:?}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(last)
                )));
            }
        }

        let value = match entry {
            Entry::Value(v) => Some(v.as_slice()),
            Entry::Tombstone => None,
        };
        let val_len = value.map_or(TOMBSTONE_MARKER, |v| v.len() as u32);

        let mut record = Vec::with_capacity(8 + key.len() + value.map_or(0, |v| v.len()));
        record.extend_from_slice(&(key.len() as u32).to_le_bytes());
        record.extend_from_slice(&val_len.to_le_bytes());
        record.extend_from_slice(key);
        if let Some(v) = value {
            record.extend_from_slice(v);
        }

        self.writer.write_all(&record)?;
        self.crc.update(&record);
        self.index.push((key.to_vec(), self.offset));
        self.offset += record.len() as u64;
        self.entry_count += 1;
        Ok(())
    }

    /// Write index block and footer, fsync, and return metadata
    pub fn finish(mut self) -> Result<SSTable> {
        let index_offset = self.offset;
        for (key, offset) in &self.index {
            self.writer.write_all(&(key.len() as u32).to_le_bytes())?;
            self.writer.write_all(&offset.to_le_bytes())?;
            self.writer.write_all(key)?;
        }

        self.writer.write_all(&index_offset.to_le_bytes())?;
        self.writer.write_all(&self.crc.clone().finalize().to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| BenchError::Storage(format!("failed to flush sorted table: {}", e)))?;
        file.seek(SeekFrom::Start(6))?; // past magic + version
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();
        let min_key = self.index.first().map(|(k, _)| k.clone()).unwrap_or_default();
        let max_key = self.index.last().map(|(k, _)| k.clone()).unwrap_or_default();

        Ok(SSTable {
            path: self.path,
            entry_count: self.entry_count,
            min_key,
            max_key,
            file_size,
        })
    }
}
