//! Core domain: records, components, billing and the engine facade.

pub mod access;
pub mod allocation;
pub mod audit;
pub mod billing;
pub mod directory;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod model;
pub mod registry;
pub mod reports;
pub mod repository;

pub use access::{AdminCapability, Caller};
pub use allocation::{AllocationPolicy, LowestIndexFirst};
pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use engine::ParkingEngine;
pub use error::{AppResult, EngineError, EngineResult, ErrorKind};
pub use inventory::{SpotCounts, SpotInventory};
pub use ledger::ReservationLedger;
pub use model::{
    BookingRequest, LotDetails, LotId, NewLot, NewReservation, NewUser, ParkingLot, ParkingSpot,
    Reservation, ReservationId, SpotId, SpotStatus, User, UserId,
};
pub use registry::{LotRegistry, LotRemoval, ResizeOutcome, MAX_COST_PER_UNIT};
pub use reports::{LotOverview, LotRevenue, ReservationView, RevenueSummary, SpotDetail, UserSummary};
pub use repository::{ParkingStore, Repository};
