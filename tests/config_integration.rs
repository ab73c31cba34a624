use clap::Parser;
use cura_chat::config::{AppConfig, Cli};
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("CURA_SERVICE__BASE_URL");
        env::remove_var("CURA_SERVICE__TIMEOUT_SECS");
        env::remove_var("CURA_STORAGE__EPHEMERAL");
        env::remove_var("CONFIG_FILE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["cura-chat"]).expect("defaults should load");
    assert_eq!(config.service.base_url, "http://127.0.0.1:5000");
    assert_eq!(config.service.timeout(), Duration::from_secs(30));
    assert_eq!(config.exchange.reply_delay(), Duration::ZERO);
    assert_eq!(
        config.storage.path.to_str(),
        Some("curaai_chat_history.json")
    );
    assert!(!config.storage.ephemeral);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("CURA_SERVICE__BASE_URL", "http://reply.internal:8080");
        env::set_var("CURA_SERVICE__TIMEOUT_SECS", "5");
        env::set_var("CURA_STORAGE__EPHEMERAL", "true");
    }

    let config = AppConfig::load_from_args(["cura-chat"]).expect("Failed to load config");
    assert_eq!(config.service.base_url, "http://reply.internal:8080");
    assert_eq!(config.service.timeout_secs, 5);
    assert!(config.storage.ephemeral);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("cura.yaml");
    fs::write(
        &file_path,
        r#"
service:
  base_url: "http://from-file:9000"
exchange:
  reply_delay_ms: 1200
"#,
    )
    .expect("Failed to write temp config");

    let config = AppConfig::load_from_args(["cura-chat", "--config", file_path.to_str().unwrap()])
        .expect("Failed to load config from file");
    assert_eq!(config.service.base_url, "http://from-file:9000");
    assert_eq!(config.exchange.reply_delay(), Duration::from_millis(1200));
    // Keys absent from the file keep their defaults.
    assert_eq!(config.service.timeout_secs, 30);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["cura-chat", "--config", "/nonexistent/cura.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("CURA_SERVICE__BASE_URL", "http://from-env:1");
    }

    let config = AppConfig::load_from_args([
        "cura-chat",
        "--service-url",
        "http://from-cli:2",
        "--history-file",
        "/tmp/history.json",
        "--ephemeral",
    ])
    .expect("Failed to load config");

    assert_eq!(config.service.base_url, "http://from-cli:2");
    assert_eq!(config.storage.path.to_str(), Some("/tmp/history.json"));
    assert!(config.storage.ephemeral);

    clear_env_vars();
}

#[test]
#[serial]
fn test_unknown_flag_is_error() {
    clear_env_vars();
    assert!(AppConfig::load_from_args(["cura-chat", "--bogus"]).is_err());
}

#[test]
#[serial]
fn test_zero_timeout_is_rejected() {
    clear_env_vars();
    assert!(AppConfig::load_from_args(["cura-chat", "--timeout-secs", "0"]).is_err());

    unsafe {
        env::set_var("CURA_SERVICE__TIMEOUT_SECS", "0");
    }
    assert!(AppConfig::load_from_args(["cura-chat"]).is_err());
    clear_env_vars();
}

#[test]
#[serial]
fn test_help_and_version_are_not_parse_errors() {
    clear_env_vars();

    let help = Cli::try_parse_from(["cura-chat", "--help"]).unwrap_err();
    assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    assert_eq!(help.exit_code(), 0);

    let version = Cli::try_parse_from(["cura-chat", "--version"]).unwrap_err();
    assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    assert_eq!(version.exit_code(), 0);

    let cli = Cli::try_parse_from(["cura-chat", "--reply-delay-ms", "250"]).unwrap();
    let config = AppConfig::from_cli(cli).expect("Failed to load config");
    assert_eq!(config.exchange.reply_delay(), Duration::from_millis(250));
}
