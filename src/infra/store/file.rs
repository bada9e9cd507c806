//! File-backed store persisting the tables as a JSON snapshot.
//!
//! Each committed transaction rewrites the snapshot through a temporary file
//! followed by a rename, so a crash leaves either the old or the new state on
//! disk. A failed write rolls the transaction back in memory as well.
//! The whole snapshot is rewritten on every commit, which suits a single
//! process with a modest history.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::core::error::{EngineError, EngineResult};
use crate::core::repository::ParkingStore;
use crate::infra::store::memory::MemoryTables;

/// Durable single-node store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<MemoryTables>,
}

impl JsonFileStore {
    /// Open the snapshot at `path`, starting empty when the file is absent.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(backend)?;
        }
        let tables = Self::load_from_disk(&path)?;
        tracing::debug!(path = %path.display(), "opened parking snapshot");
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Location of the snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> EngineResult<MemoryTables> {
        if !path.exists() {
            return Ok(MemoryTables::new());
        }
        let raw = fs::read_to_string(path).map_err(backend)?;
        if raw.trim().is_empty() {
            return Ok(MemoryTables::new());
        }
        serde_json::from_str(&raw).map_err(backend)
    }

    fn rewrite_disk(&self, tables: &MemoryTables) -> EngineResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(tables).map_err(backend)?;
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(backend)?;
        file.write_all(&body).map_err(backend)?;
        file.sync_all().map_err(backend)?;
        fs::rename(&tmp, &self.path).map_err(backend)
    }
}

impl ParkingStore for JsonFileStore {
    type Repo = MemoryTables;

    fn read<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&Self::Repo) -> EngineResult<R>,
    {
        let tables = self.tables.read();
        f(&tables)
    }

    fn transaction<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut Self::Repo) -> EngineResult<R>,
    {
        let mut committed = self.tables.write();
        let mut working = committed.clone();
        let out = f(&mut working)?;
        if let Err(err) = self.rewrite_disk(&working) {
            tracing::error!(path = %self.path.display(), error = %err, "snapshot write failed");
            return Err(err);
        }
        *committed = working;
        Ok(out)
    }
}

fn backend(err: impl std::fmt::Display) -> EngineError {
    EngineError::Backend(err.to_string())
}
