//! Configuration models for the store backend, auditing and admin seeding.

pub mod engine;

pub use engine::{AdminSeed, EngineConfig, StoreBackendConfig, DEFAULT_AUDIT_BUFFER};
