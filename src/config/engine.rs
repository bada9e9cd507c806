//! Engine configuration structures.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::core::error::AppResult;
use crate::core::model::NewUser;

/// Default number of audit events retained in memory.
pub const DEFAULT_AUDIT_BUFFER: usize = 1024;

/// Storage backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory tables for development/testing.
    #[default]
    InMemory,
    /// JSON snapshot on local disk.
    File {
        /// Snapshot file path.
        path: PathBuf,
    },
}

/// Administrator created when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSeed {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Optional 10 digit contact number.
    #[serde(default)]
    pub contact_number: Option<String>,
    /// Postal address.
    pub address: String,
}

impl AdminSeed {
    /// Validate that every required field is present.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("username", &self.username),
            ("email", &self.email),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(format!("admin {field} must not be empty"));
            }
        }
        Ok(())
    }

    /// Registration data for the seeded account.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            username: self.username.clone(),
            email: self.email.clone(),
            contact_number: self.contact_number.clone(),
            address: self.address.clone(),
        }
    }
}

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage backend.
    #[serde(default)]
    pub store: StoreBackendConfig,
    /// Audit events kept by the in-memory sink.
    #[serde(default = "default_audit_buffer")]
    pub audit_buffer: usize,
    /// Administrator to seed, if any.
    #[serde(default)]
    pub admin: Option<AdminSeed>,
}

const fn default_audit_buffer() -> usize {
    DEFAULT_AUDIT_BUFFER
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreBackendConfig::InMemory,
            audit_buffer: DEFAULT_AUDIT_BUFFER,
            admin: None,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if let StoreBackendConfig::File { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err("file store path must not be empty".into());
            }
        }
        if self.audit_buffer == 0 {
            return Err("audit_buffer must be greater than 0".into());
        }
        if let Some(admin) = &self.admin {
            admin.validate()?;
        }
        Ok(())
    }

    /// Parse engine configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `PARKING_*` environment variables, reading a
    /// `.env` file first when one exists.
    ///
    /// | Env Var                  | Default     |
    /// |--------------------------|-------------|
    /// | `PARKING_STORE`          | `in_memory` |
    /// | `PARKING_STORE_PATH`     | (none)      |
    /// | `PARKING_AUDIT_BUFFER`   | `1024`      |
    /// | `PARKING_ADMIN_USERNAME` | (no seed)   |
    /// | `PARKING_ADMIN_EMAIL`    | (none)      |
    /// | `PARKING_ADMIN_CONTACT`  | (none)      |
    /// | `PARKING_ADMIN_ADDRESS`  | (none)      |
    pub fn from_env() -> AppResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("PARKING_STORE").as_deref().map(str::trim) {
            None | Some("" | "in_memory" | "memory") => StoreBackendConfig::InMemory,
            Some("file") => {
                let path = lookup("PARKING_STORE_PATH")
                    .context("PARKING_STORE_PATH is required when PARKING_STORE=file")?;
                StoreBackendConfig::File {
                    path: PathBuf::from(path),
                }
            }
            Some(other) => return Err(anyhow!("unknown PARKING_STORE backend `{other}`")),
        };

        let audit_buffer = match lookup("PARKING_AUDIT_BUFFER") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PARKING_AUDIT_BUFFER must be an integer, got `{raw}`"))?,
            None => DEFAULT_AUDIT_BUFFER,
        };

        let admin = lookup("PARKING_ADMIN_USERNAME").map(|username| AdminSeed {
            username,
            email: lookup("PARKING_ADMIN_EMAIL").unwrap_or_default(),
            contact_number: lookup("PARKING_ADMIN_CONTACT"),
            address: lookup("PARKING_ADMIN_ADDRESS").unwrap_or_default(),
        });

        let cfg = Self {
            store,
            audit_buffer,
            admin,
        };
        cfg.validate()
            .map_err(|e| anyhow!(e))
            .context("invalid engine configuration")?;
        Ok(cfg)
    }
}
