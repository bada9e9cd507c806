//! Build a ready-to-use engine from configuration.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use parking_lot::Mutex;

use crate::config::{EngineConfig, StoreBackendConfig};
use crate::core::allocation::LowestIndexFirst;
use crate::core::audit::{AuditSink, InMemoryAuditSink, TracingAuditSink};
use crate::core::engine::ParkingEngine;
use crate::core::error::AppResult;
use crate::infra::store::{InMemoryStore, JsonFileStore, StoreBackend};
use crate::util::clock::{Clock, SystemClock};

/// Open the store described by `cfg`.
pub fn open_store(cfg: &StoreBackendConfig) -> AppResult<StoreBackend> {
    match cfg {
        StoreBackendConfig::InMemory => Ok(StoreBackend::InMemory(InMemoryStore::new())),
        StoreBackendConfig::File { path } => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("opening parking snapshot {}", path.display()))?;
            Ok(StoreBackend::File(store))
        }
    }
}

/// Engine builder with optional clock and audit overrides.
pub struct EngineBuilder<C = SystemClock> {
    config: EngineConfig,
    clock: C,
    audit: Option<Box<dyn AuditSink>>,
}

impl EngineBuilder {
    /// Start from a configuration, using wall-clock time.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
            audit: None,
        }
    }
}

impl<C: Clock> EngineBuilder<C> {
    /// Configuration the engine will be built from.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> EngineBuilder<C2> {
        EngineBuilder {
            config: self.config,
            clock,
            audit: self.audit,
        }
    }

    /// Send audit events to `sink`.
    #[must_use]
    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Keep audit events in memory, bounded by the configured buffer, and
    /// return a handle to read them.
    #[must_use]
    pub fn with_memory_audit(self) -> (Self, Arc<Mutex<InMemoryAuditSink>>) {
        let sink = Arc::new(Mutex::new(InMemoryAuditSink::new(self.config.audit_buffer)));
        let handle = Arc::clone(&sink);
        (self.with_audit(Box::new(sink)), handle)
    }

    /// Validate the configuration, open the store and seed the administrator.
    pub fn build(self) -> AppResult<ParkingEngine<StoreBackend, C, LowestIndexFirst>> {
        self.config
            .validate()
            .map_err(|e| anyhow!(e))
            .context("invalid engine configuration")?;

        let store = open_store(&self.config.store)?;
        let backend = store.name();
        let audit = self
            .audit
            .unwrap_or_else(|| Box::new(TracingAuditSink));
        let engine = ParkingEngine::with_parts(store, self.clock, LowestIndexFirst).with_audit(audit);

        if let Some(seed) = &self.config.admin {
            let admin = engine
                .ensure_admin(seed.to_new_user())
                .with_context(|| format!("seeding administrator `{}`", seed.username))?;
            tracing::info!(user_id = admin.id, "administrator available");
        }

        tracing::info!(backend, "parking engine ready");
        Ok(engine)
    }
}
