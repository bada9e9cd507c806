//! Caller identity and capabilities.
//!
//! Authentication happens elsewhere; the engine receives a [`Caller`] and
//! demands an [`AdminCapability`] for lot mutations. The capability can only
//! be obtained through [`Caller::admin`], and the engine re-checks the stored
//! admin flag when it is used.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{User, UserId};

/// Authenticated identity handed over by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Authenticated user id.
    pub user_id: UserId,
    /// Admin flag as asserted by the session layer.
    pub is_admin: bool,
}

impl Caller {
    /// A regular user.
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// An administrator.
    pub const fn administrator(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Identity of a stored user.
    pub const fn of(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.is_admin,
        }
    }

    /// Obtain the capability to mutate lots.
    pub fn admin(&self) -> EngineResult<AdminCapability> {
        if !self.is_admin {
            return Err(EngineError::Forbidden(format!(
                "user {} is not an administrator",
                self.user_id
            )));
        }
        Ok(AdminCapability {
            user_id: self.user_id,
        })
    }
}

/// Proof that a caller passed the admin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    user_id: UserId,
}

impl AdminCapability {
    /// The administrator holding the capability.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}
