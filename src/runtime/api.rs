//! Request models accepted from the presentation layer, plus a health probe.
//!
//! Forms carry the bounds the user interface enforces. Converting a form runs
//! its validation and yields the engine's request type, so handlers only ever
//! pass checked input on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{BookingRequest, LotId, NewLot, NewUser};
use crate::core::repository::{ParkingStore, Repository};
use crate::core::{AllocationPolicy, ParkingEngine};
use crate::util::clock::Clock;

/// Lowest hourly rate a lot may charge.
pub const MIN_COST_PER_UNIT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Lot creation form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LotForm {
    /// Unique location name.
    #[validate(length(min = 1, max = 100))]
    pub primary_location: String,
    /// Street address.
    #[validate(length(min = 1, max = 200))]
    pub full_address: String,
    /// Six digit postal code.
    #[validate(length(equal = 6))]
    pub pincode: String,
    /// Hourly rate, at least 25.
    pub cost_per_unit: Decimal,
    /// Spot count between 10 and 40.
    #[validate(range(min = 10, max = 40))]
    pub max_spots: u32,
}

impl LotForm {
    /// Validate and convert into a lot definition.
    pub fn into_new_lot(self) -> EngineResult<NewLot> {
        check(&self)?;
        digits("pincode", &self.pincode)?;
        min_cost(self.cost_per_unit)?;
        Ok(NewLot {
            primary_location: self.primary_location,
            full_address: self.full_address,
            pincode: self.pincode,
            max_spots: self.max_spots,
            cost_per_unit: self.cost_per_unit,
        })
    }
}

/// Lot capacity and price update form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct LotUpdateForm {
    /// New spot count between 10 and 40.
    #[validate(range(min = 10, max = 40))]
    pub max_spots: u32,
    /// New hourly rate, at least 25.
    pub cost_per_unit: Decimal,
}

impl LotUpdateForm {
    /// Validate and return `(max_spots, cost_per_unit)`.
    pub fn into_parts(self) -> EngineResult<(u32, Decimal)> {
        check(&self)?;
        min_cost(self.cost_per_unit)?;
        Ok((self.max_spots, self.cost_per_unit))
    }
}

/// Booking form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingForm {
    /// Lot to park in.
    pub lot_id: LotId,
    /// Registration plate, at most 15 characters.
    #[validate(length(min = 1, max = 15))]
    pub vehicle_plate: String,
    /// Vehicle model, at most 20 characters.
    #[validate(length(min = 1, max = 20))]
    pub vehicle_model: String,
    /// Hours between 1 and 72.
    #[validate(range(min = 1, max = 72))]
    pub requested_hours: u32,
}

impl BookingForm {
    /// Validate and convert into a booking request.
    pub fn into_request(self) -> EngineResult<BookingRequest> {
        check(&self)?;
        Ok(BookingRequest {
            lot_id: self.lot_id,
            vehicle_plate: self.vehicle_plate,
            vehicle_model: self.vehicle_model,
            requested_hours: self.requested_hours,
        })
    }
}

/// Account registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    /// Login name.
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Optional ten digit contact number.
    #[validate(length(equal = 10))]
    pub contact_number: Option<String>,
    /// Postal address.
    #[validate(length(min = 1, max = 200))]
    pub address: String,
}

impl RegistrationForm {
    /// Validate and convert into registration data.
    pub fn into_new_user(self) -> EngineResult<NewUser> {
        check(&self)?;
        if let Some(contact) = &self.contact_number {
            digits("contact_number", contact)?;
        }
        Ok(NewUser {
            username: self.username,
            email: self.email,
            contact_number: self.contact_number,
            address: self.address,
        })
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Lots currently defined.
    pub lots: usize,
    /// Failure description when unhealthy.
    pub error: Option<String>,
}

/// Probe the engine's store with a read.
pub fn health<S, C, P>(engine: &ParkingEngine<S, C, P>) -> Health
where
    S: ParkingStore,
    C: Clock,
    P: AllocationPolicy,
{
    match engine.store().read(|repo| repo.lots().map(|lots| lots.len())) {
        Ok(lots) => Health {
            ok: true,
            lots,
            error: None,
        },
        Err(err) => Health {
            ok: false,
            lots: 0,
            error: Some(err.to_string()),
        },
    }
}

fn check(form: &impl Validate) -> EngineResult<()> {
    form.validate()
        .map_err(|e| EngineError::Validation(e.to_string()))
}

fn digits(field: &str, value: &str) -> EngineResult<()> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(EngineError::Validation(format!("{field} must contain only digits")))
    }
}

fn min_cost(cost: Decimal) -> EngineResult<()> {
    if cost < MIN_COST_PER_UNIT {
        return Err(EngineError::Validation(format!(
            "cost_per_unit must be at least {MIN_COST_PER_UNIT}"
        )));
    }
    Ok(())
}
