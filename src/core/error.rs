//! Error types for engine operations.

use thiserror::Error;

use crate::core::model::{LotId, ReservationId, SpotId};

/// Broad classification of an [`EngineError`], used by callers to map
/// failures onto responses without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, rejected before domain logic runs.
    Validation,
    /// Current state already satisfies or contradicts the request.
    Conflict,
    /// Lot capacity prevents the request.
    Capacity,
    /// Unknown lot, spot, reservation or user.
    NotFound,
    /// Caller lacks the capability for the operation.
    Forbidden,
    /// Storage failure.
    Backend,
    /// Stored state violates an engine invariant.
    Invariant,
}

/// Errors produced by the reservation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another lot already uses this primary location.
    #[error("a parking lot already exists at `{location}`")]
    DuplicateLocation {
        /// The clashing location.
        location: String,
    },
    /// Another user already uses this username, email or contact number.
    #[error("{field} `{value}` is already registered")]
    DuplicateUser {
        /// Name of the clashing field.
        field: &'static str,
        /// The clashing value.
        value: String,
    },
    /// The vehicle already holds an active reservation.
    #[error("vehicle {plate} already has an active reservation")]
    VehicleAlreadyActive {
        /// Normalized plate number.
        plate: String,
    },
    /// The chosen spot already has an active reservation.
    #[error("spot {spot_id} is already reserved")]
    SpotAlreadyReserved {
        /// Spot identifier.
        spot_id: SpotId,
    },
    /// The reservation was already released.
    #[error("reservation {reservation_id} has already been released")]
    AlreadyReleased {
        /// Reservation identifier.
        reservation_id: ReservationId,
    },
    /// Price changes are blocked while any spot is occupied.
    #[error("cannot change the price of lot {lot_id} while {occupied} spot(s) are occupied")]
    PriceChangeBlocked {
        /// Lot identifier.
        lot_id: LotId,
        /// Occupied spots at the time of the request.
        occupied: u32,
    },

    /// No spot is available in the lot.
    #[error("lot {lot_id} has no available spots")]
    LotFull {
        /// Lot identifier.
        lot_id: LotId,
    },
    /// The requested capacity is below the number of occupied spots.
    #[error("lot {lot_id} has {occupied} occupied spot(s); cannot resize to {requested}")]
    OccupiedSpotsExceedCapacity {
        /// Lot identifier.
        lot_id: LotId,
        /// Occupied spots.
        occupied: u32,
        /// Requested capacity.
        requested: u32,
    },
    /// A spot selected for removal turned out to be in use.
    #[error("spot {spot_id} of lot {lot_id} became occupied during shrink")]
    SpotOccupiedDuringShrink {
        /// Lot identifier.
        lot_id: LotId,
        /// Spot identifier.
        spot_id: SpotId,
    },
    /// A lot with occupied spots cannot be deleted.
    #[error("lot {lot_id} still has {occupied} occupied spot(s)")]
    LotHasOccupiedSpots {
        /// Lot identifier.
        lot_id: LotId,
        /// Occupied spots.
        occupied: u32,
    },

    /// Referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (`lot`, `spot`, `reservation`, `user`).
        entity: &'static str,
        /// Identifier that was looked up.
        id: u64,
    },

    /// Caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage backend failure with context.
    #[error("backend error: {0}")]
    Backend(String),

    /// Stored state is inconsistent.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// Classify the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateLocation { .. }
            | Self::DuplicateUser { .. }
            | Self::VehicleAlreadyActive { .. }
            | Self::SpotAlreadyReserved { .. }
            | Self::AlreadyReleased { .. }
            | Self::PriceChangeBlocked { .. } => ErrorKind::Conflict,
            Self::LotFull { .. }
            | Self::OccupiedSpotsExceedCapacity { .. }
            | Self::SpotOccupiedDuringShrink { .. }
            | Self::LotHasOccupiedSpots { .. } => ErrorKind::Capacity,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Backend(_) => ErrorKind::Backend,
            Self::Invariant(_) => ErrorKind::Invariant,
        }
    }

    pub(crate) const fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result alias for engine and store operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
