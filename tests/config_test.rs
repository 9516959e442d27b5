//! Tests for config loading from the environment and TOML files

use review_watcher::config::{Config, ConfigError, DEFAULT_ENDPOINT, DEFAULT_INTERVAL_SECS};
use serial_test::serial;
use std::io::Write;

const VARS: &[&str] = &[
    "PRACTICUM_TOKEN",
    "PRACTICUM_ENDPOINT",
    "REVIEW_REQUEST_TIMEOUT",
    "TELEGRAM_TOKEN",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_API_BASE",
    "RETRY_PERIOD",
    "REVIEW_LOG_LEVEL",
    "REVIEW_LOG_FORMAT",
    "REVIEW_LOG_FILE",
    "REVIEW_METRICS_ADDR",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn set_credentials() {
    std::env::set_var("PRACTICUM_TOKEN", "practicum-token");
    std::env::set_var("TELEGRAM_TOKEN", "123456:telegram-token");
    std::env::set_var("TELEGRAM_CHAT_ID", "42");
}

#[test]
#[serial]
fn test_load_from_env() {
    clear_env();
    set_credentials();

    let config = Config::load(None).unwrap();

    assert_eq!(config.api.token, "practicum-token");
    assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.telegram.chat_id, "42");
    assert_eq!(config.poller.interval_secs, DEFAULT_INTERVAL_SECS);
    assert!(config.metrics.bind_address.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_missing_variables_are_named() {
    clear_env();
    std::env::set_var("PRACTICUM_TOKEN", "practicum-token");
    std::env::set_var("TELEGRAM_CHAT_ID", "  ");

    let err = Config::load(None).unwrap_err();

    match err {
        ConfigError::MissingVariables(names) => {
            assert_eq!(names, vec!["TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"]);
        }
        other => panic!("expected missing variables, got {other:?}"),
    }

    clear_env();
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    set_credentials();
    std::env::set_var("RETRY_PERIOD", "30");
    std::env::set_var("PRACTICUM_ENDPOINT", "http://localhost:8080/statuses/");
    std::env::set_var("REVIEW_METRICS_ADDR", "127.0.0.1:9100");

    let config = Config::load(None).unwrap();

    assert_eq!(config.poller.interval_secs, 30);
    assert_eq!(config.api.endpoint, "http://localhost:8080/statuses/");
    assert_eq!(
        config.metrics.bind_address.map(|a| a.port()),
        Some(9100)
    );

    clear_env();
}

#[test]
#[serial]
fn test_unparsable_env_value() {
    clear_env();
    set_credentials();
    std::env::set_var("RETRY_PERIOD", "ten minutes");

    let err = Config::load(None).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "RETRY_PERIOD"));

    clear_env();
}

#[test]
#[serial]
fn test_env_takes_precedence_over_file() {
    clear_env();
    set_credentials();
    std::env::set_var("TELEGRAM_CHAT_ID", "from-env");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[telegram]
chat_id = "from-file"
timeout_secs = 3

[poller]
interval_secs = 120

[logging]
format = "json"
"#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.telegram.chat_id, "from-env");
    assert_eq!(config.telegram.timeout_secs, 3);
    assert_eq!(config.poller.interval_secs, 120);
    assert_eq!(config.logging.format, "json");

    clear_env();
}

#[test]
#[serial]
fn test_broken_file_is_parse_error() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[poller\ninterval_secs = ").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
#[serial]
fn test_missing_file_is_read_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}
