//! Sorted table reader
//!
//! Keeps the whole index in memory; entry bytes are read on demand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{BenchError, Result};
use crate::memtable::Entry;

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, TOMBSTONE_MARKER, VERSION};

/// Reader for sorted table files
///
/// The file cursor sits behind a mutex so lookups only need `&self` and the
/// manager can serve them under a shared lock.
pub struct SSTableReader {
    path: PathBuf,
    file: Mutex<BufReader<File>>,
    /// key → file offset of its entry
    index: BTreeMap<Vec<u8>, u64>,
    entry_count: u64,
}

impl SSTableReader {
    /// Open a sorted table and load its index
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();
        if file_size < HEADER_SIZE + FOOTER_SIZE {
            return Err(BenchError::Storage(format!(
                "sorted table {} is too short ({} bytes)",
                path.display(),
                file_size
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        if &header[0..4] != MAGIC {
            return Err(BenchError::Storage(format!(
                "invalid sorted table magic in {}: {:?}",
                path.display(),
                &header[0..4]
            )));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(BenchError::Storage(format!(
                "unsupported sorted table version: {}",
                version
            )));
        }
        let entry_count = u64::from_le_bytes(header[6..14].try_into().expect("8-byte slice"));

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;
        let index_offset = u64::from_le_bytes(footer[0..8].try_into().expect("8-byte slice"));
        if index_offset < HEADER_SIZE || index_offset > file_size - FOOTER_SIZE {
            return Err(BenchError::Storage(format!(
                "corrupt index offset {} in {}",
                index_offset,
                path.display()
            )));
        }

        let mut block = vec![0u8; (file_size - FOOTER_SIZE - index_offset) as usize];
        file.seek(SeekFrom::Start(index_offset))?;
        file.read_exact(&mut block)?;
        let index = parse_index(&block).ok_or_else(|| {
            BenchError::Storage(format!("truncated index block in {}", path.display()))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(BufReader::new(file)),
            index,
            entry_count,
        })
    }

    /// Look up a key
    ///
    /// Returns:
    /// - `Ok(Some(Entry::Value))`: key stored here
    /// - `Ok(Some(Entry::Tombstone))`: key deleted as of this table
    /// - `Ok(None)`: this table says nothing about the key
    pub fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        let Some(&offset) = self.index.get(key) else {
            return Ok(None);
        };
        let mut file = self.file.lock();
        let (_, entry) = read_entry_at(&mut file, offset)?;
        Ok(Some(entry))
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Entry)>> {
        let offsets: Vec<u64> = self
            .index
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, &off)| off)
            .collect();

        let mut file = self.file.lock();
        offsets
            .into_iter()
            .map(|off| read_entry_at(&mut file, off))
            .collect()
    }

    /// Quick range check: false only if `key` is outside [min_key, max_key]
    pub fn might_contain(&self, key: &[u8]) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => key >= min && key <= max,
            _ => false,
        }
    }

    pub fn min_key(&self) -> Option<&[u8]> {
        self.index.keys().next().map(Vec::as_slice)
    }

    pub fn max_key(&self) -> Option<&[u8]> {
        self.index.keys().next_back().map(Vec::as_slice)
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse `[key_len u32][offset u64][key]*`; `None` if the block is truncated
fn parse_index(block: &[u8]) -> Option<BTreeMap<Vec<u8>, u64>> {
    let mut index = BTreeMap::new();
    let mut pos = 0;
    while pos < block.len() {
        let key_len = u32::from_le_bytes(block.get(pos..pos + 4)?.try_into().ok()?) as usize;
        pos += 4;
        let offset = u64::from_le_bytes(block.get(pos..pos + 8)?.try_into().ok()?);
        pos += 8;
        let key = block.get(pos..pos + key_len)?.to_vec();
        pos += key_len;
        index.insert(key, offset);
    }
    Some(index)
}

fn read_entry_at(file: &mut BufReader<File>, offset: u64) -> Result<(Vec<u8>, Entry)> {
    file.seek(SeekFrom::Start(offset))?;

    let mut header = [0u8; 8];
    file.read_exact(&mut header)?;
    let key_len = u32::from_le_bytes(header[0..4].try_into().expect("4-byte slice")) as usize;
    let val_len = u32::from_le_bytes(header[4..8].try_into().expect("4-byte slice"));

    let mut key = vec![0u8; key_len];
    file.read_exact(&mut key)?;

    if val_len == TOMBSTONE_MARKER {
        return Ok((key, Entry::Tombstone));
    }
    let mut value = vec![0u8; val_len as usize];
    file.read_exact(&mut value)?;
    Ok((key, Entry::Value(value)))
}
