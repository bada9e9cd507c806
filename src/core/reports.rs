//! Read models for the presentation layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::billing;
use crate::core::error::EngineResult;
use crate::core::inventory::SpotCounts;
use crate::core::model::{LotId, ParkingLot, ParkingSpot, Reservation, UserId};
use crate::core::repository::Repository;

/// Label shown in place of a lot that no longer exists.
pub const REMOVED_LOT_LABEL: &str = "Deleted lot";

/// A lot with its live spot counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotOverview {
    /// The lot.
    pub lot: ParkingLot,
    /// Spot totals.
    pub counts: SpotCounts,
}

/// A spot with whoever currently holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotDetail {
    /// The spot.
    pub spot: ParkingSpot,
    /// Active reservation on the spot.
    pub reservation: Option<Reservation>,
    /// Cost accrued so far by that reservation.
    pub running_cost: Option<Decimal>,
}

/// One reservation as shown in a user's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationView {
    /// The reservation.
    pub reservation: Reservation,
    /// Lot the reservation belongs (or belonged) to.
    pub lot_id: Option<LotId>,
    /// Display label for the lot.
    pub lot_label: String,
    /// Whether the lot has been deleted.
    pub lot_removed: bool,
    /// Index of the spot, when it still exists.
    pub spot_index: Option<u32>,
    /// Whether the reservation is still open.
    pub active: bool,
    /// Final cost, or the running cost of an open reservation.
    pub cost: Decimal,
    /// Minutes parked so far.
    pub duration_minutes: i64,
}

/// Reservations and revenue attributed to one lot id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotRevenue {
    /// Current or archived lot id.
    pub lot_id: LotId,
    /// Current or archived location.
    pub primary_location: String,
    /// Whether the lot has been deleted.
    pub lot_removed: bool,
    /// Reservations ever made.
    pub reservations: usize,
    /// Reservations still open.
    pub active: usize,
    /// Sum of final costs.
    pub revenue: Decimal,
}

/// Admin dashboard totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Per lot breakdown, ordered by lot id.
    pub lots: Vec<LotRevenue>,
    /// Spots across existing lots.
    pub total_spots: u32,
    /// Occupied spots across existing lots.
    pub occupied_spots: u32,
    /// Revenue across all lots, deleted ones included.
    pub total_revenue: Decimal,
}

/// Per-user dashboard totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// The user.
    pub user_id: UserId,
    /// Reservations ever made.
    pub reservations: usize,
    /// Reservations still open.
    pub active: usize,
    /// Sum of final costs.
    pub total_spent: Decimal,
}

/// Where a reservation is attributed.
struct Attribution {
    lot_id: Option<LotId>,
    lot: Option<ParkingLot>,
    spot: Option<ParkingSpot>,
    archived_location: Option<String>,
}

impl Attribution {
    fn resolve<R: Repository>(repo: &R, reservation: &Reservation) -> EngineResult<Self> {
        let spot = match reservation.spot_id {
            Some(id) => repo.spot(id)?,
            None => None,
        };
        let lot_id = spot
            .as_ref()
            .map(|s| s.lot_id)
            .or(reservation.archived_lot_id);
        let lot = match lot_id {
            Some(id) => repo.lot(id)?,
            None => None,
        };
        Ok(Self {
            lot_id,
            lot,
            spot,
            archived_location: reservation.archived_primary_location.clone(),
        })
    }

    fn location(&self) -> String {
        self.lot
            .as_ref()
            .map(|l| l.primary_location.clone())
            .or_else(|| self.archived_location.clone())
            .unwrap_or_else(|| REMOVED_LOT_LABEL.to_string())
    }

    fn label(&self) -> String {
        match (&self.lot, &self.archived_location) {
            (Some(lot), _) => lot.primary_location.clone(),
            (None, Some(location)) => format!("{REMOVED_LOT_LABEL} ({location})"),
            (None, None) => REMOVED_LOT_LABEL.to_string(),
        }
    }
}

/// Every lot with its spot counts, ordered by id.
pub fn lot_overviews<R: Repository>(repo: &R) -> EngineResult<Vec<LotOverview>> {
    repo.lots()?
        .into_iter()
        .map(|lot| {
            let counts = SpotCounts::from_spots(&repo.spots_in_lot(lot.id)?);
            Ok(LotOverview { lot, counts })
        })
        .collect()
}

/// Lots whose location, address or pincode contains `query`, ignoring case.
pub fn search_lots<R: Repository>(repo: &R, query: &str) -> EngineResult<Vec<LotOverview>> {
    let needle = query.trim().to_lowercase();
    let mut overviews = lot_overviews(repo)?;
    if !needle.is_empty() {
        overviews.retain(|o| {
            o.lot.primary_location.to_lowercase().contains(&needle)
                || o.lot.full_address.to_lowercase().contains(&needle)
                || o.lot.pincode.contains(&needle)
        });
    }
    Ok(overviews)
}

/// Spots of a lot in index order with their active reservations.
pub fn lot_spots<R: Repository>(repo: &R, lot_id: LotId, now: DateTime<Utc>) -> EngineResult<Vec<SpotDetail>> {
    repo.spots_in_lot(lot_id)?
        .into_iter()
        .map(|spot| {
            let reservation = repo.active_reservation_for_spot(spot.id)?;
            let running_cost = reservation
                .as_ref()
                .map(|r| billing::reservation_cost(r, now))
                .transpose()?;
            Ok(SpotDetail {
                spot,
                reservation,
                running_cost,
            })
        })
        .collect()
}

/// A user's reservations, newest first.
pub fn user_reservations<R: Repository>(
    repo: &R,
    user_id: UserId,
    now: DateTime<Utc>,
) -> EngineResult<Vec<ReservationView>> {
    let mut reservations = repo.reservations_for_user(user_id)?;
    reservations.sort_by(|a, b| b.check_in.cmp(&a.check_in).then(b.id.cmp(&a.id)));
    reservations
        .into_iter()
        .map(|reservation| {
            let attribution = Attribution::resolve(repo, &reservation)?;
            let cost = match reservation.final_cost {
                Some(cost) => cost,
                None => billing::reservation_cost(&reservation, now)?,
            };
            Ok(ReservationView {
                lot_id: attribution.lot_id,
                lot_label: attribution.label(),
                lot_removed: attribution.lot.is_none(),
                spot_index: attribution.spot.as_ref().map(|s| s.spot_index),
                active: reservation.is_active(),
                cost,
                duration_minutes: billing::parking_duration(&reservation, now).num_minutes(),
                reservation,
            })
        })
        .collect()
}

/// Revenue and occupancy grouped by lot id, or archived lot id once the lot
/// is gone.
pub fn revenue_summary<R: Repository>(repo: &R) -> EngineResult<RevenueSummary> {
    let mut by_lot: BTreeMap<LotId, LotRevenue> = BTreeMap::new();
    let mut total_spots = 0;
    let mut occupied_spots = 0;

    for overview in lot_overviews(repo)? {
        total_spots += overview.counts.total;
        occupied_spots += overview.counts.occupied;
        by_lot.insert(
            overview.lot.id,
            LotRevenue {
                lot_id: overview.lot.id,
                primary_location: overview.lot.primary_location,
                lot_removed: false,
                reservations: 0,
                active: 0,
                revenue: Decimal::ZERO,
            },
        );
    }

    for reservation in repo.reservations()? {
        let attribution = Attribution::resolve(repo, &reservation)?;
        let Some(lot_id) = attribution.lot_id else {
            continue;
        };
        let entry = by_lot.entry(lot_id).or_insert_with(|| LotRevenue {
            lot_id,
            primary_location: attribution.location(),
            lot_removed: attribution.lot.is_none(),
            reservations: 0,
            active: 0,
            revenue: Decimal::ZERO,
        });
        entry.reservations += 1;
        if reservation.is_active() {
            entry.active += 1;
        }
        entry.revenue += reservation.final_cost.unwrap_or(Decimal::ZERO);
    }

    let lots: Vec<LotRevenue> = by_lot.into_values().collect();
    let total_revenue = lots.iter().map(|l| l.revenue).sum();
    Ok(RevenueSummary {
        lots,
        total_spots,
        occupied_spots,
        total_revenue,
    })
}

/// Totals for one user.
pub fn user_summary<R: Repository>(repo: &R, user_id: UserId) -> EngineResult<UserSummary> {
    let reservations = repo.reservations_for_user(user_id)?;
    Ok(UserSummary {
        user_id,
        reservations: reservations.len(),
        active: reservations.iter().filter(|r| r.is_active()).count(),
        total_spent: reservations.iter().filter_map(|r| r.final_cost).sum(),
    })
}
