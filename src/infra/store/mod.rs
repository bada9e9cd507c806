//! Storage backends implementing [`ParkingStore`].

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::{InMemoryStore, MemoryTables};

use crate::core::error::EngineResult;
use crate::core::repository::ParkingStore;

/// Backend chosen at runtime from configuration.
#[derive(Debug)]
pub enum StoreBackend {
    /// Process-local tables.
    InMemory(InMemoryStore),
    /// Tables persisted to a JSON snapshot.
    File(JsonFileStore),
}

impl StoreBackend {
    /// Short backend name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "in_memory",
            Self::File(_) => "file",
        }
    }
}

impl ParkingStore for StoreBackend {
    type Repo = MemoryTables;

    fn read<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&Self::Repo) -> EngineResult<R>,
    {
        match self {
            Self::InMemory(store) => store.read(f),
            Self::File(store) => store.read(f),
        }
    }

    fn transaction<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut Self::Repo) -> EngineResult<R>,
    {
        match self {
            Self::InMemory(store) => store.transaction(f),
            Self::File(store) => store.transaction(f),
        }
    }
}
