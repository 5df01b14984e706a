//! Configuration Error Tests.
//!
//! The messages are what a user sees when a config file is rejected, so
//! they must name the offending level and numbers.

use memsim_core::common::ConfigError;
use pretty_assertions::assert_eq;

#[test]
fn field_width_message_names_level() {
    let err = ConfigError::FieldWidths {
        level: "L2",
        used: 30,
        available: 27,
    };
    assert_eq!(
        err.to_string(),
        "L2: offset/tag-low/set-index widths use 30 bits but addresses have 27"
    );
}

#[test]
fn burst_message_names_minimum() {
    let err = ConfigError::BurstLength { len: 6, min: 4 };
    assert_eq!(
        err.to_string(),
        "burst length must be a power of two of at least 4 bytes, got 6"
    );
}

#[test]
fn parse_error_converts_from_serde() {
    let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
    let err = ConfigError::from(serde_err);
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("failed to parse configuration"));
}
