//! Audit sink implementations.
//!
//! Events are recorded after a mutation commits, never for rejected requests.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{LotId, ReservationId, SpotId, UserId};

/// Committed mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A user registered.
    UserRegistered,
    /// A lot was created.
    LotCreated,
    /// A lot's capacity or price changed.
    LotResized,
    /// A lot's descriptive fields changed.
    LotEdited,
    /// A lot was deleted.
    LotDeleted,
    /// A spot was booked.
    SpotBooked,
    /// A spot was released.
    SpotReleased,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UserRegistered => "user_registered",
            Self::LotCreated => "lot_created",
            Self::LotResized => "lot_resized",
            Self::LotEdited => "lot_edited",
            Self::LotDeleted => "lot_deleted",
            Self::SpotBooked => "spot_booked",
            Self::SpotReleased => "spot_released",
        };
        f.write_str(name)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// User who performed the action.
    pub actor: UserId,
    /// Action taken.
    pub action: AuditAction,
    /// Lot involved, if any.
    pub lot_id: Option<LotId>,
    /// Spot involved, if any.
    pub spot_id: Option<SpotId>,
    /// Reservation involved, if any.
    pub reservation_id: Option<ReservationId>,
    /// When the action committed.
    pub created_at: DateTime<Utc>,
    /// Additional context.
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Start an event with a fresh id.
    pub fn new(actor: UserId, action: AuditAction, created_at: DateTime<Utc>) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            actor,
            action,
            lot_id: None,
            spot_id: None,
            reservation_id: None,
            created_at,
            detail: None,
        }
    }

    /// Attach a lot.
    #[must_use]
    pub fn lot(mut self, lot_id: LotId) -> Self {
        self.lot_id = Some(lot_id);
        self
    }

    /// Attach a spot, if known.
    #[must_use]
    pub fn spot(mut self, spot_id: Option<SpotId>) -> Self {
        self.spot_id = spot_id;
        self
    }

    /// Attach a reservation.
    #[must_use]
    pub fn reservation(mut self, reservation_id: ReservationId) -> Self {
        self.reservation_id = Some(reservation_id);
        self
    }

    /// Attach free-form context.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

impl<S: AuditSink> AuditSink for std::sync::Arc<parking_lot::Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// Sink that emits each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::info!(
            target: "parking_reservation::audit",
            event_id = %event.event_id,
            actor = event.actor,
            action = %event.action,
            lot_id = ?event.lot_id,
            spot_id = ?event.spot_id,
            reservation_id = ?event.reservation_id,
            detail = event.detail.as_deref().unwrap_or(""),
            "audit"
        );
    }
}
