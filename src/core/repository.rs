//! Repository and transaction abstractions.
//!
//! Components never hold storage themselves: they receive a `&mut` repository
//! for the duration of one transaction opened through [`ParkingStore`].
//! Lookups return owned snapshots so backends are free to materialize rows
//! however they like.

use crate::core::error::EngineResult;
use crate::core::model::{
    LotId, NewLot, NewReservation, NewUser, ParkingLot, ParkingSpot, Reservation,
    ReservationId, SpotId, SpotStatus, User, UserId,
};

/// CRUD and query access to the engine's tables.
///
/// Implementations must enforce the uniqueness constraints a relational
/// schema would: unique lot location, unique `(lot_id, spot_index)`, unique
/// username/email/contact number, and at most one active reservation per
/// spot and per plate.
pub trait Repository {
    /// Insert a user.
    fn insert_user(&mut self, user: NewUser, is_admin: bool) -> EngineResult<User>;
    /// Look up a user by id.
    fn user(&self, id: UserId) -> EngineResult<Option<User>>;
    /// Look up a user by username.
    fn user_by_username(&self, username: &str) -> EngineResult<Option<User>>;
    /// Look up a user by email.
    fn user_by_email(&self, email: &str) -> EngineResult<Option<User>>;
    /// Look up a user by contact number.
    fn user_by_contact(&self, contact_number: &str) -> EngineResult<Option<User>>;

    /// Insert a lot (without spots).
    fn insert_lot(&mut self, lot: NewLot) -> EngineResult<ParkingLot>;
    /// Look up a lot by id.
    fn lot(&self, id: LotId) -> EngineResult<Option<ParkingLot>>;
    /// Look up a lot by its exact primary location.
    fn lot_by_location(&self, location: &str) -> EngineResult<Option<ParkingLot>>;
    /// All lots ordered by id.
    fn lots(&self) -> EngineResult<Vec<ParkingLot>>;
    /// Overwrite a lot row.
    fn update_lot(&mut self, lot: &ParkingLot) -> EngineResult<()>;
    /// Delete a lot row. Spots must already be gone.
    fn delete_lot(&mut self, id: LotId) -> EngineResult<()>;

    /// Insert an available spot.
    fn insert_spot(&mut self, lot_id: LotId, spot_index: u32) -> EngineResult<ParkingSpot>;
    /// Look up a spot by id.
    fn spot(&self, id: SpotId) -> EngineResult<Option<ParkingSpot>>;
    /// Spots of a lot ordered by index.
    fn spots_in_lot(&self, lot_id: LotId) -> EngineResult<Vec<ParkingSpot>>;
    /// Overwrite a spot's status.
    fn set_spot_status(&mut self, id: SpotId, status: SpotStatus) -> EngineResult<()>;
    /// Delete a spot row.
    fn delete_spot(&mut self, id: SpotId) -> EngineResult<()>;

    /// Insert a reservation.
    fn insert_reservation(&mut self, reservation: NewReservation) -> EngineResult<Reservation>;
    /// Look up a reservation by id.
    fn reservation(&self, id: ReservationId) -> EngineResult<Option<Reservation>>;
    /// Overwrite a reservation row.
    fn update_reservation(&mut self, reservation: &Reservation) -> EngineResult<()>;
    /// Active reservation holding `plate`, if any.
    fn active_reservation_for_plate(&self, plate: &str) -> EngineResult<Option<Reservation>>;
    /// Active reservation holding `spot_id`, if any.
    fn active_reservation_for_spot(&self, spot_id: SpotId) -> EngineResult<Option<Reservation>>;
    /// Every reservation (active or not) referencing `spot_id`.
    fn reservations_for_spot(&self, spot_id: SpotId) -> EngineResult<Vec<Reservation>>;
    /// Every reservation made by `user_id`.
    fn reservations_for_user(&self, user_id: UserId) -> EngineResult<Vec<Reservation>>;
    /// Every reservation ordered by id.
    fn reservations(&self) -> EngineResult<Vec<Reservation>>;
}

/// A transactional store of engine tables.
///
/// `transaction` must be all-or-nothing: if the closure returns an error no
/// change it made is observable afterwards. Write transactions are mutually
/// exclusive, which gives bookings and lot edits a consistent view of a lot's
/// spot set.
pub trait ParkingStore: Send + Sync {
    /// Repository type handed to closures.
    type Repo: Repository;

    /// Run a read-only closure against committed state.
    fn read<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&Self::Repo) -> EngineResult<R>;

    /// Run a closure inside an exclusive write transaction.
    fn transaction<R, F>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut Self::Repo) -> EngineResult<R>;
}
