//! Tests for configuration module.

use super::*;

#[test_log::test]
fn defaults_apply_without_file() {
    let settings = Settings::load_from("definitely-missing-recurrent-config").unwrap();

    assert_eq!(settings.calendar.prodid, DEFAULT_PRODID);
    assert!(settings.expansion.max_instances > 0);
    assert!(settings.expansion.max_empty_periods > 0);
}

#[test]
fn expansion_config_default_matches_constants() {
    let config = ExpansionConfig::default();

    assert_eq!(config.max_instances, 1000);
    assert_eq!(config.max_empty_periods, 10_000);
}

#[test]
fn prodid_is_fpi_shaped() {
    assert_eq!(DEFAULT_PRODID, "-//Recurrent//Recurrent Engine//EN");
}

#[test]
fn zero_limits_are_rejected() {
    let config = ExpansionConfig {
        max_instances: 0,
        ..ExpansionConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(CoreError::ZeroLimit("expansion.max_instances"))
    );

    let config = ExpansionConfig {
        max_empty_periods: 0,
        ..ExpansionConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(CoreError::ZeroLimit("expansion.max_empty_periods"))
    );
}

#[test]
fn blank_prodid_is_rejected() {
    let mut settings = Settings::load_from("definitely-missing-recurrent-config").unwrap();
    settings.calendar.prodid = "  ".to_owned();
    assert!(matches!(settings.validate(), Err(CoreError::ConfigError(_))));
}
