//! WAL Writer
//!
//! Appends records to the WAL file and applies the configured sync strategy.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::Result;

use super::entry::{encode_record, now_millis};
use super::Operation;

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN handed to the next appended record
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Records appended since the last fsync
    unsynced: usize,
}

impl WalWriter {
    /// Create (or truncate) a WAL file, numbering records from 1
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        Self::open_at(path, sync_strategy, 1)
    }

    /// Create (or truncate) a WAL file, numbering records from `next_lsn`
    pub fn open_at(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append an operation. Returns the LSN assigned to it.
    pub fn append(&mut self, operation: &Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let record = encode_record(lsn, operation, now_millis())?;
        self.writer.write_all(&record)?;
        self.next_lsn += 1;
        self.unsynced += 1;

        match self.sync_strategy {
            WalSyncStrategy::EveryWrite => self.sync()?,
            WalSyncStrategy::EveryNEntries { count } => {
                if self.unsynced >= count {
                    self.sync()?;
                }
            }
            WalSyncStrategy::Never => self.writer.flush()?,
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Discard every record (their effects are durable elsewhere).
    /// LSNs keep increasing across truncations.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;
        self.unsynced = 0;
        Ok(())
    }

    /// LSN of the last appended record (0 if none yet)
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn - 1
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
