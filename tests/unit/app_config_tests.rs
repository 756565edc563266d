/*!
 * Tests for app configuration
 */

use crge_explorer::app_config::{Config, LogLevel};

use tempfile::TempDir;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.backend.url = "https://project.example.co".to_string();
    config.backend.anon_key = "anon-key".to_string();
    config
}

#[test]
fn test_config_default_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.backend.timeout_secs, 30);
    assert_eq!(config.cache.ttl_secs, 600);
    assert!(!config.cache.scope_to_token);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_validate_withCompleteBackend_shouldPass() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_config_validate_withMissingUrl_shouldFail() {
    let mut config = valid_config();
    config.backend.url = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withMalformedUrl_shouldFail() {
    let mut config = valid_config();
    config.backend.url = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withMissingAnonKey_shouldFail() {
    let mut config = valid_config();
    config.backend.anon_key = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withZeroTtl_shouldFail() {
    let mut config = valid_config();
    config.cache.ttl_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withZeroTimeout_shouldFail() {
    let mut config = valid_config();
    config.backend.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_saveAndLoad_shouldRoundTrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = valid_config();
    config.cache.ttl_secs = 120;
    config.cache.scope_to_token = true;
    config.log_level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.backend.url, config.backend.url);
    assert_eq!(loaded.cache.ttl_secs, 120);
    assert!(loaded.cache.scope_to_token);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_config_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.cache.ttl_secs, 600);
    // A created default has no backend credentials yet
    assert!(config.validate().is_err());
}

#[test]
fn test_config_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{"backend": {"url": "https://project.example.co", "anon_key": "k"}}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.backend.timeout_secs, 30);
    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_fromFile_withMalformedJson_shouldFail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(Config::from_file(&path).is_err());
}
