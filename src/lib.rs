//! # Parking Reservation
//!
//! Spot allocation and reservation lifecycle engine for multi-lot vehicle
//! parking.
//!
//! Administrators define parking lots, each with a fixed number of indexed
//! spots and an hourly price. Users reserve the lowest-index free spot in a
//! lot for one vehicle, release it on checkout, and are billed by whole
//! elapsed hours. Every mutation runs as a single store transaction so spot
//! occupancy and reservation rows never disagree.
//!
//! ## Key Features
//!
//! - **Deterministic allocation**: the available spot with the lowest index wins
//! - **Capacity control**: lots grow and shrink without touching occupied spots
//! - **History preservation**: reservations of removed spots keep their lot
//!   identity through archived fields
//! - **Pluggable storage**: in-memory tables or a JSON snapshot on disk
//! - **Async facade**: a tokio wrapper for async hosts (`tokio-runtime` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use parking_reservation::builders::EngineBuilder;
//! use parking_reservation::config::EngineConfig;
//! use parking_reservation::core::{BookingRequest, Caller, NewLot, NewUser};
//! use rust_decimal::Decimal;
//!
//! let engine = EngineBuilder::new(EngineConfig::default()).build()?;
//! let admin = engine.ensure_admin(admin_details)?;
//! let lot = engine.create_lot(&Caller::of(&admin).admin()?, NewLot {
//!     primary_location: "Indiranagar".into(),
//!     full_address: "100ft Road".into(),
//!     pincode: "560038".into(),
//!     max_spots: 10,
//!     cost_per_unit: Decimal::from(25),
//! })?;
//!
//! let user = engine.register_user(user_details)?;
//! let reservation = engine.book_spot(&Caller::of(&user), BookingRequest {
//!     lot_id: lot.id,
//!     vehicle_plate: "KA01AB1234".into(),
//!     vehicle_model: "Swift".into(),
//!     requested_hours: 2,
//! })?;
//! engine.release_spot(&Caller::of(&user), reservation.id)?;
//! ```
//!
//! For complete scenarios, see `tests/engine_lifecycle_test.rs` and
//! `tests/lot_capacity_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Domain records, components, billing and the engine facade.
pub mod core;
/// Configuration models for the store backend, auditing and admin seeding.
pub mod config;
/// Builders to construct the engine from configuration.
pub mod builders;
/// Infrastructure adapters for storage backends.
pub mod infra;
/// Runtime adapters and request models.
pub mod runtime;
/// Shared utilities.
pub mod util;
