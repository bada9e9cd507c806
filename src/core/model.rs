//! Domain records: users, lots, spots and reservations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User identifier.
pub type UserId = u64;
/// Parking lot identifier.
pub type LotId = u64;
/// Parking spot identifier.
pub type SpotId = u64;
/// Reservation identifier.
pub type ReservationId = u64;

/// A registered user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Unique contact number, if given.
    pub contact_number: Option<String>,
    /// Postal address.
    pub address: String,
    /// Whether the user may manage lots.
    pub is_admin: bool,
}

/// Input for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Contact number.
    pub contact_number: Option<String>,
    /// Postal address.
    pub address: String,
}

/// A parking facility with a bounded number of spots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingLot {
    /// Unique identifier.
    pub id: LotId,
    /// Unique display key (case-sensitive).
    pub primary_location: String,
    /// Street address.
    pub full_address: String,
    /// Six digit postal code.
    pub pincode: String,
    /// Capacity target; the lot always owns exactly this many spots.
    pub max_spots: u32,
    /// Price per hour; billing counts completed hours only.
    pub cost_per_unit: Decimal,
}

/// Input for creating a lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLot {
    /// Unique display key.
    pub primary_location: String,
    /// Street address.
    pub full_address: String,
    /// Postal code.
    pub pincode: String,
    /// Initial capacity.
    pub max_spots: u32,
    /// Price per hour.
    pub cost_per_unit: Decimal,
}

/// Descriptive lot fields that may be edited at any time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotDetails {
    /// New primary location.
    pub primary_location: Option<String>,
    /// New street address.
    pub full_address: Option<String>,
    /// New postal code.
    pub pincode: Option<String>,
}

/// Occupancy state of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotStatus {
    /// Free to book.
    Available,
    /// Held by an active reservation.
    Occupied,
}

/// One unit of capacity within a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Unique identifier.
    pub id: SpotId,
    /// Owning lot.
    pub lot_id: LotId,
    /// Stable ordinal within the lot.
    pub spot_index: u32,
    /// Current status.
    pub status: SpotStatus,
}

impl ParkingSpot {
    /// Whether the spot can be booked.
    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available
    }
}

/// A booking of one spot by one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier.
    pub id: ReservationId,
    /// Booking user.
    pub user_id: UserId,
    /// Booked spot; cleared once the spot has been deleted.
    pub spot_id: Option<SpotId>,
    /// Check-in instant.
    pub check_in: DateTime<Utc>,
    /// Check-in plus the requested hours.
    pub estimated_checkout: DateTime<Utc>,
    /// Set when the spot is released.
    pub actual_checkout: Option<DateTime<Utc>>,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Normalized plate number.
    pub vehicle_plate: String,
    /// Lot price captured at booking time.
    pub cost_per_unit: Decimal,
    /// Price of the requested hours.
    pub estimated_cost: Decimal,
    /// Billed amount, set at release.
    pub final_cost: Option<Decimal>,
    /// Lot id copied before the lot or spot was deleted.
    pub archived_lot_id: Option<LotId>,
    /// Lot location copied before the lot or spot was deleted.
    pub archived_primary_location: Option<String>,
    /// Spot id copied before the spot was deleted.
    pub archived_spot_id: Option<SpotId>,
}

impl Reservation {
    /// Active means not yet released.
    pub fn is_active(&self) -> bool {
        self.final_cost.is_none() && self.actual_checkout.is_none()
    }

    /// Whether the owning spot no longer exists.
    pub fn is_archived(&self) -> bool {
        self.archived_lot_id.is_some()
    }
}

/// Row data for a reservation about to be inserted.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Booking user.
    pub user_id: UserId,
    /// Allocated spot.
    pub spot_id: SpotId,
    /// Check-in instant.
    pub check_in: DateTime<Utc>,
    /// Expected checkout.
    pub estimated_checkout: DateTime<Utc>,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Normalized plate.
    pub vehicle_plate: String,
    /// Price snapshot.
    pub cost_per_unit: Decimal,
    /// Price of the requested hours.
    pub estimated_cost: Decimal,
}

/// A user's request to park in a lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Target lot.
    pub lot_id: LotId,
    /// Plate number as typed.
    pub vehicle_plate: String,
    /// Vehicle model.
    pub vehicle_model: String,
    /// Hours the user expects to stay.
    pub requested_hours: u32,
}

/// Canonical form of a plate number: surrounding whitespace removed, ASCII
/// letters upper-cased.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_ascii_uppercase()
}
