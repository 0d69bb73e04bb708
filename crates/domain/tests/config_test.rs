use qrmatch_domain::config::{CliOverrides, Config};
use std::time::Duration;

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.capture.dns_port, 53);
    assert!(config.capture.input.is_none());
    assert_eq!(config.correlator.query_timeout_ms, 5000);
    assert_eq!(config.correlator.sweep_interval_ms, 1000);
    assert_eq!(config.output.structured_queue_capacity, 10_000);
    assert_eq!(config.output.raw_queue_capacity, 10_000);
    assert_eq!(config.output.ignored_queue_capacity, 10_000);
    assert!(config.output.structured_path.is_none());
    assert!(config.output.raw_pcap_path.is_none());
    assert!(config.output.ignored_pcap_path.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.stats.report_interval_secs, 0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_parses_partial_toml() {
    let config = Config::from_toml(
        r#"
        [correlator]
        query_timeout_ms = 2000

        [output]
        raw_pcap_path = "/tmp/raw.pcap"
        raw_queue_capacity = 16
        "#,
    )
    .unwrap();

    assert_eq!(config.correlator.query_timeout(), Duration::from_secs(2));
    assert_eq!(config.correlator.sweep_interval_ms, 1000);
    assert_eq!(config.output.raw_pcap_path.as_deref(), Some("/tmp/raw.pcap"));
    assert_eq!(config.output.raw_queue_capacity, 16);
    assert_eq!(config.output.structured_queue_capacity, 10_000);
}

#[test]
fn test_config_rejects_invalid_toml() {
    assert!(Config::from_toml("[correlator\nquery_timeout_ms = ").is_err());
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let mut config = Config::default();
    config.correlator.query_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_queue_capacity() {
    let mut config = Config::default();
    config.output.ignored_queue_capacity = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("ignored"));
}

#[test]
fn test_cli_overrides_take_precedence() {
    let config = Config::load(
        None,
        CliOverrides {
            input: Some("capture.pcap".to_string()),
            structured_path: Some("out.jsonl".to_string()),
            query_timeout_ms: Some(250),
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.capture.input.as_deref(), Some("capture.pcap"));
    assert_eq!(config.output.structured_path.as_deref(), Some("out.jsonl"));
    assert_eq!(config.correlator.query_timeout_ms, 250);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let result = Config::load(Some("/nonexistent/qrmatch.toml"), CliOverrides::default());
    assert!(result.is_err());
}
