//! Tests for audit sink

use chrono::Utc;
use parking_reservation::core::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let event = AuditEvent::new(7, AuditAction::SpotBooked, Utc::now())
        .lot(1)
        .spot(Some(4))
        .reservation(9)
        .detail("plate=KA01AB1234");

    sink.record(event.clone());
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].actor, 7);
    assert_eq!(events[0].spot_id, Some(4));
    assert_eq!(events[0].detail.as_deref(), Some("plate=KA01AB1234"));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    let now = Utc::now();
    sink.record(AuditEvent::new(1, AuditAction::UserRegistered, now));
    sink.record(AuditEvent::new(2, AuditAction::UserRegistered, now));
    sink.record(AuditEvent::new(3, AuditAction::UserRegistered, now));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].actor, 2); // First one popped
    assert_eq!(events[1].actor, 3);
}

#[test]
fn test_event_ids_are_unique() {
    let now = Utc::now();
    let a = AuditEvent::new(1, AuditAction::LotCreated, now);
    let b = AuditEvent::new(1, AuditAction::LotCreated, now);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_tracing_sink_accepts_events() {
    let mut sink = TracingAuditSink;
    sink.record(AuditEvent::new(1, AuditAction::LotDeleted, Utc::now()).lot(5));
}

#[test]
fn test_event_serializes_action_in_snake_case() {
    let event = AuditEvent::new(1, AuditAction::SpotReleased, Utc::now());
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["action"], "spot_released");
}
