//! Tests for configuration validation

use std::collections::HashMap;

use prometheus_work_queue::config::{
    SchedulerConfig, ENV_LOG_DRAIN, ENV_MAX_CONCURRENCY, ENV_NAME,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_validation() {
    let valid = SchedulerConfig {
        name: "quotes".to_string(),
        max_concurrency: 5,
        log_drain: true,
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_config_invalid_max_concurrency() {
    let invalid = SchedulerConfig::with_max_concurrency(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_name() {
    let invalid = SchedulerConfig {
        name: "  ".to_string(),
        ..SchedulerConfig::with_max_concurrency(2)
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "name": "quotes",
        "max_concurrency": 5,
        "log_drain": false
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.name, "quotes");
    assert_eq!(config.max_concurrency, 5);
    assert!(!config.log_drain);
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = SchedulerConfig::from_json_str(r#"{ "max_concurrency": 3 }"#).unwrap();
    assert_eq!(config.name, "work-queue");
    assert_eq!(config.max_concurrency, 3);
    assert!(config.log_drain);
}

#[test]
fn test_config_from_json_rejects_zero() {
    let err = SchedulerConfig::from_json_str(r#"{ "max_concurrency": 0 }"#).unwrap_err();
    assert!(err.contains("max_concurrency"));
}

#[test]
fn test_config_from_json_parse_error() {
    let err = SchedulerConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_config_from_lookup() {
    let config = SchedulerConfig::from_lookup(lookup(&[
        (ENV_NAME, "crawler"),
        (ENV_MAX_CONCURRENCY, " 8 "),
        (ENV_LOG_DRAIN, "off"),
    ]))
    .unwrap();
    assert_eq!(config.name, "crawler");
    assert_eq!(config.max_concurrency, 8);
    assert!(!config.log_drain);
}

#[test]
fn test_config_from_lookup_defaults() {
    let config = SchedulerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, SchedulerConfig::default());
}

#[test]
fn test_config_from_lookup_bad_values() {
    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_MAX_CONCURRENCY, "lots")])).unwrap_err();
    assert!(err.contains(ENV_MAX_CONCURRENCY));

    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_MAX_CONCURRENCY, "0")])).unwrap_err();
    assert!(err.contains("greater than 0"));

    let err = SchedulerConfig::from_lookup(lookup(&[(ENV_LOG_DRAIN, "sometimes")])).unwrap_err();
    assert!(err.contains(ENV_LOG_DRAIN));
}
