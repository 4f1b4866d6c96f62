//! Per-run workspace directory
//!
//! Created uniquely under a root, owned by exactly one run, removed on every
//! exit path (explicitly via [`Workspace::release`], or on drop).

use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;

const PREFIX: &str = "bucketbench-";

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named directory under `root`
    pub fn acquire(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir_in(root)?;
        debug!(path = %dir.path().display(), "acquired workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory, reporting failures instead of ignoring them
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "released workspace");
        Ok(())
    }
}
