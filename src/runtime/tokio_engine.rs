//! Tokio facade over the blocking engine.
//!
//! Store transactions take a blocking lock and the file backend does disk
//! I/O, so every call is moved onto tokio's blocking pool.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::core::access::{AdminCapability, Caller};
use crate::core::allocation::{AllocationPolicy, LowestIndexFirst};
use crate::core::engine::ParkingEngine;
use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{
    BookingRequest, LotDetails, LotId, NewLot, NewUser, ParkingLot, Reservation, ReservationId,
    User, UserId,
};
use crate::core::registry::{LotRemoval, ResizeOutcome};
use crate::core::reports::{LotOverview, ReservationView, RevenueSummary, SpotDetail, UserSummary};
use crate::core::repository::ParkingStore;
use crate::util::clock::{Clock, SystemClock};

/// Cloneable async handle to a shared [`ParkingEngine`].
pub struct AsyncParkingEngine<S, C = SystemClock, P = LowestIndexFirst> {
    inner: Arc<ParkingEngine<S, C, P>>,
}

impl<S, C, P> Clone for AsyncParkingEngine<S, C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C, P> AsyncParkingEngine<S, C, P>
where
    S: ParkingStore + 'static,
    C: Clock + 'static,
    P: AllocationPolicy + 'static,
{
    /// Wrap an engine.
    pub fn new(engine: ParkingEngine<S, C, P>) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }

    /// Share an engine that is also used synchronously.
    pub const fn from_arc(engine: Arc<ParkingEngine<S, C, P>>) -> Self {
        Self { inner: engine }
    }

    /// The wrapped engine.
    pub const fn engine(&self) -> &Arc<ParkingEngine<S, C, P>> {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ParkingEngine<S, C, P>) -> EngineResult<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| EngineError::Backend(format!("blocking task failed: {e}")))?
    }

    /// See [`ParkingEngine::register_user`].
    pub async fn register_user(&self, new: NewUser) -> EngineResult<User> {
        self.run(move |e| e.register_user(new)).await
    }

    /// See [`ParkingEngine::create_lot`].
    pub async fn create_lot(&self, admin: AdminCapability, new: NewLot) -> EngineResult<ParkingLot> {
        self.run(move |e| e.create_lot(&admin, new)).await
    }

    /// See [`ParkingEngine::resize_lot`].
    pub async fn resize_lot(
        &self,
        admin: AdminCapability,
        lot_id: LotId,
        new_max_spots: u32,
        new_cost_per_unit: Decimal,
    ) -> EngineResult<ResizeOutcome> {
        self.run(move |e| e.resize_lot(&admin, lot_id, new_max_spots, new_cost_per_unit))
            .await
    }

    /// See [`ParkingEngine::edit_lot`].
    pub async fn edit_lot(
        &self,
        admin: AdminCapability,
        lot_id: LotId,
        details: LotDetails,
    ) -> EngineResult<ParkingLot> {
        self.run(move |e| e.edit_lot(&admin, lot_id, details)).await
    }

    /// See [`ParkingEngine::delete_lot`].
    pub async fn delete_lot(&self, admin: AdminCapability, lot_id: LotId) -> EngineResult<LotRemoval> {
        self.run(move |e| e.delete_lot(&admin, lot_id)).await
    }

    /// See [`ParkingEngine::book_spot`].
    pub async fn book_spot(&self, caller: Caller, request: BookingRequest) -> EngineResult<Reservation> {
        self.run(move |e| e.book_spot(&caller, request)).await
    }

    /// See [`ParkingEngine::release_spot`].
    pub async fn release_spot(
        &self,
        caller: Caller,
        reservation_id: ReservationId,
    ) -> EngineResult<Reservation> {
        self.run(move |e| e.release_spot(&caller, reservation_id)).await
    }

    /// See [`ParkingEngine::list_lots`].
    pub async fn list_lots(&self) -> EngineResult<Vec<LotOverview>> {
        self.run(|e| e.list_lots()).await
    }

    /// See [`ParkingEngine::search_lots`].
    pub async fn search_lots(&self, query: String) -> EngineResult<Vec<LotOverview>> {
        self.run(move |e| e.search_lots(&query)).await
    }

    /// See [`ParkingEngine::lot_spots`].
    pub async fn lot_spots(&self, lot_id: LotId) -> EngineResult<Vec<SpotDetail>> {
        self.run(move |e| e.lot_spots(lot_id)).await
    }

    /// See [`ParkingEngine::user_reservations`].
    pub async fn user_reservations(&self, user_id: UserId) -> EngineResult<Vec<ReservationView>> {
        self.run(move |e| e.user_reservations(user_id)).await
    }

    /// See [`ParkingEngine::revenue_summary`].
    pub async fn revenue_summary(&self) -> EngineResult<RevenueSummary> {
        self.run(|e| e.revenue_summary()).await
    }

    /// See [`ParkingEngine::user_summary`].
    pub async fn user_summary(&self, user_id: UserId) -> EngineResult<UserSummary> {
        self.run(move |e| e.user_summary(user_id)).await
    }
}
