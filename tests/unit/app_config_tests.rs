/*!
 * Tests for application configuration
 */

use anyhow::Result;
use metaforge::app_config::{Config, LogLevel};
use crate::common;

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.resolver.base_url, "https://doi.org");
    assert_eq!(config.resolver.concurrent_requests, 10);
    assert_eq!(config.converter.args, vec!["--from", "latex", "--to", "jats"]);

    // Reloading the written file gives the same settings
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.resolver.timeout_secs, config.resolver.timeout_secs);
    Ok(())
}

/// Test that an existing config file is read as-is
#[test]
fn test_load_or_create_withExistingFile_shouldParseIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"resolver": {"concurrent_requests": 4}, "converter": {"command": "/opt/pandoc"}, "log_level": "warn"}"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.resolver.concurrent_requests, 4);
    assert_eq!(config.converter.command, "/opt/pandoc");
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test that malformed JSON is reported rather than replaced
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Test validation of the resolver settings
#[test]
fn test_validate_withBadResolverSettings_shouldFail() {
    let mut config = Config::default();
    config.resolver.base_url = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.resolver.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.converter.command = "  ".to_string();
    assert!(config.validate().is_err());
}

/// Test the mapping from config levels to log filters
#[test]
fn test_log_level_shouldMapToLevelFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
