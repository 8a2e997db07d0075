//! Tests for show-config CLI command
//!
//! Tests the config command handler:
//! - Human, JSON and TOML output
//! - Configurations with and without a chunking mode

use komodo::cli::commands::config::{execute, ConfigArgs};
use komodo::cli::OutputFormat;
use komodo::core::types::ChunkingMode;
use komodo::Config;

fn configured() -> Config {
    let mut config = Config::default();
    config.chunking.select(ChunkingMode::Semantic { max_units: 40 });
    config.filter.priority_rules = vec!["*.rs,10".to_string()];
    config.filter.file_type = Some(".rs".to_string());
    config
}

/// Test config display (human format)
#[test]
fn test_show_config_human() {
    let result = execute(ConfigArgs { toml: false }, &configured(), OutputFormat::Human);
    assert!(result.is_ok());
}

/// Test config display (JSON format)
#[test]
fn test_show_config_json() {
    let result = execute(ConfigArgs { toml: false }, &configured(), OutputFormat::Json);
    assert!(result.is_ok());
}

/// Test config display without any chunking mode
#[test]
fn test_show_config_without_mode() {
    let result = execute(ConfigArgs { toml: false }, &Config::default(), OutputFormat::Human);
    assert!(result.is_ok());
}

/// Test TOML output parses back into the same configuration
#[test]
fn test_show_config_toml_round_trip() {
    let config = configured();
    let result = execute(ConfigArgs { toml: true }, &config, OutputFormat::Human);
    assert!(result.is_ok());

    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(
        parsed.chunking_mode().unwrap(),
        ChunkingMode::Semantic { max_units: 40 }
    );
    assert_eq!(parsed.filter.file_type.as_deref(), Some(".rs"));
    assert_eq!(parsed.filter.priority_rules, config.filter.priority_rules);
}
