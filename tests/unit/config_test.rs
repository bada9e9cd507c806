//! Tests for configuration validation

use std::collections::HashMap;
use std::path::PathBuf;

use parking_reservation::config::{AdminSeed, EngineConfig, StoreBackendConfig, DEFAULT_AUDIT_BUFFER};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn seed() -> AdminSeed {
    AdminSeed {
        username: "admin".into(),
        email: "adminvp@parking.test".into(),
        contact_number: Some("9988776655".into()),
        address: "Admin Headquarters".into(),
    }
}

#[test]
fn test_default_config_is_valid() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.store, StoreBackendConfig::InMemory);
    assert_eq!(cfg.audit_buffer, DEFAULT_AUDIT_BUFFER);
}

#[test]
fn test_zero_audit_buffer_rejected() {
    let cfg = EngineConfig {
        audit_buffer: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_empty_file_path_rejected() {
    let cfg = EngineConfig {
        store: StoreBackendConfig::File {
            path: PathBuf::new(),
        },
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_incomplete_admin_seed_rejected() {
    let cfg = EngineConfig {
        admin: Some(AdminSeed {
            email: "  ".into(),
            ..seed()
        }),
        ..EngineConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("email"));
}

#[test]
fn test_from_json_str() {
    let json = r#"{
        "store": { "kind": "file", "path": "/var/lib/parking/state.json" },
        "audit_buffer": 64,
        "admin": {
            "username": "admin",
            "email": "adminvp@parking.test",
            "address": "Admin Headquarters"
        }
    }"#;
    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File {
            path: PathBuf::from("/var/lib/parking/state.json")
        }
    );
    assert_eq!(cfg.audit_buffer, 64);
    assert_eq!(cfg.admin.unwrap().contact_number, None);
}

#[test]
fn test_from_json_str_defaults_and_errors() {
    let cfg = EngineConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());

    let err = EngineConfig::from_json_str("{ \"store\": ").unwrap_err();
    assert!(err.starts_with("parse error"));
    assert!(EngineConfig::from_json_str(r#"{ "audit_buffer": 0 }"#).is_err());
}

#[test]
fn test_from_lookup_reads_parking_vars() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("PARKING_STORE", "file"),
        ("PARKING_STORE_PATH", "/tmp/parking.json"),
        ("PARKING_AUDIT_BUFFER", "16"),
        ("PARKING_ADMIN_USERNAME", "admin"),
        ("PARKING_ADMIN_EMAIL", "adminvp@parking.test"),
        ("PARKING_ADMIN_CONTACT", "9988776655"),
        ("PARKING_ADMIN_ADDRESS", "Admin Headquarters"),
    ]))
    .unwrap();
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File {
            path: PathBuf::from("/tmp/parking.json")
        }
    );
    assert_eq!(cfg.audit_buffer, 16);
    assert_eq!(cfg.admin, Some(seed()));
}

#[test]
fn test_from_lookup_rejects_bad_values() {
    assert!(EngineConfig::from_lookup(lookup(&[("PARKING_STORE", "postgres")])).is_err());
    assert!(EngineConfig::from_lookup(lookup(&[("PARKING_STORE", "file")])).is_err());
    assert!(EngineConfig::from_lookup(lookup(&[("PARKING_AUDIT_BUFFER", "lots")])).is_err());
    // A username without the rest of the seed is incomplete.
    assert!(EngineConfig::from_lookup(lookup(&[("PARKING_ADMIN_USERNAME", "admin")])).is_err());
    assert_eq!(
        EngineConfig::from_lookup(lookup(&[])).unwrap(),
        EngineConfig::default()
    );
}
