//! Settings loading from layered files

use std::fs;

use roi_quiz_config::{load_settings_from, ConfigError, RetryQueueBackend, RuntimeEnvironment};

#[test]
fn test_missing_files_give_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings_from(dir.path(), None).unwrap();

    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.retry_queue.path, "data/pending_leads.json");
    assert_eq!(settings.observability.log_level, "info");
}

#[test]
fn test_environment_file_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[server]
port = 9000
cors_origins = ["https://example.com.au"]

[retry_queue]
backend = "memory"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("staging.toml"),
        r#"
environment = "staging"

[submission]
endpoint = "https://staging.example.com.au/wp-json/roi-calculator/v1/submit-lead"
timeout_ms = 3000

[retry_queue]
backend = "file"
path = "/var/lib/roi-quiz/pending.json"
"#,
    )
    .unwrap();

    let dev = load_settings_from(dir.path(), None).unwrap();
    assert_eq!(dev.server.port, 9000);
    assert_eq!(dev.retry_queue.backend, RetryQueueBackend::Memory);

    let staging = load_settings_from(dir.path(), Some("staging")).unwrap();
    assert_eq!(staging.environment, RuntimeEnvironment::Staging);
    assert_eq!(staging.server.port, 9000);
    assert_eq!(staging.server.cors_origins, vec!["https://example.com.au"]);
    assert_eq!(staging.submission.timeout_ms, 3000);
    assert_eq!(staging.retry_queue.backend, RetryQueueBackend::File);
    assert_eq!(staging.retry_queue.path, "/var/lib/roi-quiz/pending.json");
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[submission]\ntimeout_ms = 10\n",
    )
    .unwrap();

    let err = load_settings_from(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "submission.timeout_ms"));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.toml"), "[server\nport = ").unwrap();

    assert!(matches!(
        load_settings_from(dir.path(), None),
        Err(ConfigError::ParseError(_))
    ));
}
