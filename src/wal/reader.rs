//! WAL Reader
//!
//! Sequentially decodes and validates records from a WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{BenchError, Result};

use super::{WalEntry, HEADER_SIZE};

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Offset just past the last record that decoded cleanly
    position: u64,
    file_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns:
    /// - `Ok(Some(entry))`: a valid record
    /// - `Ok(None)`: clean end of file
    /// - `Err(WalCorruption)`: torn write, bad CRC or undecodable payload
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(self.corruption("torn record header"));
        }

        let lsn = u64::from_le_bytes(header[0..8].try_into().expect("8-byte slice"));
        let crc = u32::from_le_bytes(header[8..12].try_into().expect("4-byte slice"));
        let len = u32::from_le_bytes(header[12..16].try_into().expect("4-byte slice")) as u64;

        // A length pointing past EOF is a torn write (or a corrupted header)
        let remaining = self.file_len - self.position - HEADER_SIZE as u64;
        if len > remaining {
            return Err(self.corruption("record length exceeds file"));
        }

        let mut payload = vec![0u8; len as usize];
        self.reader.read_exact(&mut payload)?;

        if crc32fast::hash(&payload) != crc {
            return Err(self.corruption("CRC mismatch"));
        }

        let entry = WalEntry::decode(&payload).map_err(|_| self.corruption("bad payload"))?;
        if entry.lsn != lsn {
            return Err(self.corruption("LSN mismatch between header and payload"));
        }

        self.position += HEADER_SIZE as u64 + len;
        Ok(Some(entry))
    }

    /// Offset just past the last valid record
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length of the file when it was opened
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Iterate over all valid entries, stopping after the first error
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    fn corruption(&self, what: &str) -> BenchError {
        BenchError::WalCorruption(format!("{} at offset {}", what, self.position))
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Like `read_exact`, but reports how much was read instead of failing on EOF
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
