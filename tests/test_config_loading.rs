use lazyfile::config::LazyConfig;
use lazyfile::LazyError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
request_timeout_secs: 15
connect_timeout_secs: 3
max_retries: 5
retry_base_backoff_ms: 250
user_agent: "wheel-inspector/2.0"
require_accept_ranges: true
"#,
    );

    let config = LazyConfig::from_file(file.path()).unwrap();
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(config.connect_timeout_secs, 3);
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_base_backoff_ms, 250);
    assert_eq!(config.user_agent, "wheel-inspector/2.0");
    assert!(config.require_accept_ranges);
}

#[test]
fn test_load_minimal_config() {
    let file = write_config("max_retries: 0\n");

    let config = LazyConfig::from_file(file.path()).unwrap();
    assert_eq!(config.max_retries, 0);
    // Check defaults are applied
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.connect_timeout_secs, 10);
    assert!(!config.require_accept_ranges);
}

#[test]
fn test_load_invalid_config() {
    let file = write_config("request_timeout_secs: 0\n");

    let config = LazyConfig::from_file(file.path());
    assert!(
        matches!(config, Err(LazyError::ConfigError(_))),
        "Should fail validation for zero timeout"
    );
}

#[test]
fn test_load_nonexistent_file() {
    let config = LazyConfig::from_file("nonexistent-lazyfile.yaml");
    assert!(matches!(config, Err(LazyError::ConfigError(msg)) if msg.contains("read")));
}
