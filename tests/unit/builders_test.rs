//! Tests for builder modules

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use parking_reservation::builders::{open_store, EngineBuilder};
use parking_reservation::config::{AdminSeed, EngineConfig, StoreBackendConfig};
use parking_reservation::core::{AuditAction, Caller, NewUser};
use parking_reservation::infra::StoreBackend;
use parking_reservation::util::ManualClock;

fn seeded_config() -> EngineConfig {
    EngineConfig {
        audit_buffer: 8,
        admin: Some(AdminSeed {
            username: "admin".into(),
            email: "adminvp@parking.test".into(),
            contact_number: None,
            address: "Admin Headquarters".into(),
        }),
        ..EngineConfig::default()
    }
}

#[test]
fn test_builder_defaults() {
    let builder = EngineBuilder::new(seeded_config());
    assert_eq!(builder.config().audit_buffer, 8);
    let engine = builder.build().unwrap();
    assert!(matches!(engine.store(), StoreBackend::InMemory(_)));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let cfg = EngineConfig {
        audit_buffer: 0,
        ..EngineConfig::default()
    };
    let err = EngineBuilder::new(cfg).build().err().unwrap();
    assert!(format!("{err:#}").contains("audit_buffer"));
}

#[test]
fn test_builder_with_clock_and_memory_audit() {
    let start = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let (builder, audit) = EngineBuilder::new(seeded_config())
        .with_clock(Arc::clone(&clock))
        .with_memory_audit();
    let engine = builder.build().unwrap();

    clock.advance(Duration::minutes(5));
    let user = engine
        .register_user(NewUser {
            username: "builder-user".into(),
            email: "builder-user@parking.test".into(),
            contact_number: None,
            address: "3 Test Street".into(),
        })
        .unwrap();
    assert!(!Caller::of(&user).is_admin);

    let events = audit.lock().events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserRegistered);
    assert_eq!(events[0].created_at, start + Duration::minutes(5));
}

#[test]
fn test_seed_conflicting_with_regular_user_fails() {
    let cfg = seeded_config();
    let store = open_store(&StoreBackendConfig::InMemory).unwrap();
    assert_eq!(store.name(), "in_memory");

    let (builder, _) = EngineBuilder::new(EngineConfig {
        admin: None,
        ..cfg.clone()
    })
    .with_memory_audit();
    let engine = builder.build().unwrap();
    engine
        .register_user(NewUser {
            username: "admin".into(),
            email: "squatter@parking.test".into(),
            contact_number: None,
            address: "Nowhere".into(),
        })
        .unwrap();
    let admin = cfg.admin.unwrap();
    assert!(engine.ensure_admin(admin.to_new_user()).is_err());
}
