//! Infrastructure adapters for storage backends.

pub mod store;

pub use store::{InMemoryStore, JsonFileStore, MemoryTables, StoreBackend};
