//! Unit tests for TOML configuration parsing, defaults, and validation.

use pipe_courier::config::{CourierConfig, DispatchConfig, PipeConfig};
use pipe_courier::CourierError;

/// An empty TOML document yields the documented defaults.
#[test]
fn empty_toml_yields_defaults() {
    let config = CourierConfig::from_toml_str("").expect("empty config must parse");

    assert_eq!(config.pipe.name, "pipe-courier");
    assert_eq!(config.pipe.connect_timeout_ms, 50);
    assert_eq!(config.pipe.origin_system, "pipe-courier");
    assert_eq!(config.dispatch.type_header, "MessageType");
    assert_eq!(config, CourierConfig::default());
}

/// Explicit values override every default.
#[test]
fn explicit_values_override_defaults() {
    let raw = r#"
        [pipe]
        name = "orders"
        connect_timeout_ms = 200
        origin_system = "billing"

        [dispatch]
        type_header = "Kind"
    "#;
    let config = CourierConfig::from_toml_str(raw).expect("config must parse");

    assert_eq!(config.pipe.name, "orders");
    assert_eq!(config.pipe.connect_timeout_ms, 200);
    assert_eq!(config.pipe.origin_system, "billing");
    assert_eq!(config.dispatch.type_header, "Kind");
}

/// Partially specified sections fall back field by field.
#[test]
fn partial_sections_use_field_defaults() {
    let raw = r#"
        [pipe]
        name = "orders"
    "#;
    let config = CourierConfig::from_toml_str(raw).expect("config must parse");

    assert_eq!(config.pipe.name, "orders");
    assert_eq!(config.pipe.connect_timeout_ms, 50);
    assert_eq!(config.dispatch, DispatchConfig::default());
}

/// Syntactically invalid TOML is a config error.
#[test]
fn invalid_toml_returns_config_error() {
    let result = CourierConfig::from_toml_str("[pipe\nname = ");
    assert!(matches!(result, Err(CourierError::Config(_))));
}

/// An empty pipe name fails validation.
#[test]
fn empty_pipe_name_fails_validation() {
    let result = CourierConfig::from_toml_str("[pipe]\nname = \"\"");
    match result {
        Err(CourierError::Config(msg)) => {
            assert!(msg.contains("pipe.name"), "message must name the field: {msg}");
        }
        other => panic!("expected config error, got: {other:?}"),
    }
}

/// An empty type header fails validation.
#[test]
fn empty_type_header_fails_validation() {
    let result = CourierConfig::from_toml_str("[dispatch]\ntype_header = \"\"");
    assert!(matches!(result, Err(CourierError::Config(_))));
}

/// A missing config file is reported as a config error, not an I/O panic.
#[test]
fn missing_file_returns_config_error() {
    let result = CourierConfig::load_from_path("/nonexistent/pipe-courier.toml");
    assert!(matches!(result, Err(CourierError::Config(_))));
}

/// `PipeConfig::default` matches the serde field defaults.
#[test]
fn pipe_config_default_matches_serde_defaults() {
    let parsed = CourierConfig::from_toml_str("[pipe]").expect("empty pipe section must parse");
    assert_eq!(parsed.pipe, PipeConfig::default());
}
